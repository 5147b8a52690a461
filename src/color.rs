use palette::Srgb;
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Series colours
// ---------------------------------------------------------------------------

/// The default ten-colour cycle of the Python plotting stack PIXON users
/// compare against ("tab10").
const CYCLE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Pixel-grid reconstructions.
pub const PIXEL: RGBColor = RGBColor(255, 0, 0);
/// Uniform-grid reconstructions.
pub const UNIFORM: RGBColor = RGBColor(0, 0, 255);

const FALLBACK: RGBColor = RGBColor(128, 128, 128);

/// Parse `#rrggbb` / `#rgb` into a plotters colour.
pub fn parse_hex(hex: &str) -> Option<RGBColor> {
    let rgb: Srgb<u8> = hex.parse().ok()?;
    Some(RGBColor(rgb.red, rgb.green, rgb.blue))
}

/// The `index`-th colour of the default cycle, wrapping around.
pub fn cycle_color(index: usize) -> RGBColor {
    parse_hex(CYCLE[index % CYCLE.len()]).unwrap_or(FALLBACK)
}

/// Colour of the observed continuum error bars.
pub fn observed_cont() -> RGBColor {
    cycle_color(0)
}

/// Colour of the observed line error bars.
pub fn observed_line() -> RGBColor {
    cycle_color(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_starts_blue_then_orange() {
        assert_eq!(observed_cont(), RGBColor(0x1f, 0x77, 0xb4));
        assert_eq!(observed_line(), RGBColor(0xff, 0x7f, 0x0e));
        assert_eq!(cycle_color(10), cycle_color(0));
    }

    #[test]
    fn short_hex_and_garbage() {
        assert_eq!(parse_hex("#f00"), Some(RGBColor(255, 0, 0)));
        assert_eq!(parse_hex("red"), None);
    }
}
