use std::path::{Path, PathBuf};

use log::info;

use super::model::RunType;
use crate::error::{PlotError, Result};

/// Section header injected in front of the flat parameter file.
pub const DUMP_SECTION: &str = "dump";

// ---------------------------------------------------------------------------
// ParamFile – the raw key/value dump
// ---------------------------------------------------------------------------

/// One `[section]` of an INI-style file, keys in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub name: String,
    entries: Vec<(String, Option<String>)>,
}

impl Section {
    fn new(name: &str) -> Self {
        Section {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    /// Raw value for `key`. `Some(None)` is a bare key without `=`.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        let key = key.to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_deref())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parsed `param_input`: the injected `dump` section plus any sections
/// the file declared itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamFile {
    pub path: PathBuf,
    sections: Vec<Section>,
}

impl ParamFile {
    /// Read `path` and parse it under an injected `[dump]` header.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PlotError::config(path, "parameter file not found"),
            _ => PlotError::from_io(path, e),
        })?;
        let file = Self::parse(path, &format!("[{DUMP_SECTION}]\n{text}"))?;

        if let Some(dump) = file.section(DUMP_SECTION) {
            for (key, value) in dump.entries() {
                info!("{key} {}", value.unwrap_or("None"));
            }
        }
        Ok(file)
    }

    /// Parse INI text with `=` as the only delimiter.
    ///
    /// * `#` / `;` lines are comments, blank lines are skipped
    /// * keys are trimmed and lower-cased, values trimmed
    /// * a line without `=` is a key with no value
    /// * an indented line continues the previous value
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let mut sections: Vec<Section> = Vec::new();
        // Whether the last key can take continuation lines.
        let mut open_value = false;

        for (i, raw) in text.lines().enumerate() {
            let lineno = i + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                open_value = false;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indented = raw.starts_with(|c: char| c.is_whitespace());
            if indented && open_value {
                if let Some(Some(value)) = sections
                    .last_mut()
                    .and_then(|s| s.entries.last_mut())
                    .map(|(_, v)| v.as_mut())
                {
                    value.push('\n');
                    value.push_str(trimmed);
                    continue;
                }
            }

            if let Some(name) = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
            {
                if sections.iter().any(|s| s.name == name) {
                    return Err(PlotError::config(
                        path,
                        format!("line {lineno}: section '{name}' already exists"),
                    ));
                }
                sections.push(Section::new(name));
                open_value = false;
                continue;
            }

            let section = sections.last_mut().ok_or_else(|| {
                PlotError::config(path, format!("line {lineno}: key outside of any section"))
            })?;

            let (key, value) = match trimmed.split_once('=') {
                Some((k, v)) => (k.trim(), Some(v.trim().to_string())),
                None => (trimmed, None),
            };
            if key.is_empty() {
                return Err(PlotError::config(
                    path,
                    format!("line {lineno}: cannot split '{trimmed}' into key=value"),
                ));
            }

            let key = key.to_lowercase();
            if section.entries.iter().any(|(k, _)| *k == key) {
                return Err(PlotError::config(
                    path,
                    format!("line {lineno}: duplicate key '{key}' in [{}]", section.name),
                ));
            }
            open_value = value.is_some();
            section.entries.push((key, value));
        }

        Ok(ParamFile {
            path: path.to_path_buf(),
            sections,
        })
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// The injected section holding the flat keys.
    pub fn dump(&self) -> Option<&Section> {
        self.section(DUMP_SECTION)
    }

    /// Value of a required key in the dump section.
    pub fn require(&self, key: &str) -> Result<&str> {
        match self.dump().and_then(|s| s.get(key)) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(PlotError::config(
                &self.path,
                format!("key '{key}' has no value"),
            )),
            None => Err(PlotError::config(&self.path, format!("missing key '{key}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Params – the typed view the pipeline needs
// ---------------------------------------------------------------------------

/// Which reconstructions to plot, from `drv_lc_model`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunSelection {
    Single(RunType),
    All,
}

impl RunSelection {
    /// Decode `drv_lc_model`: 0..=2 pick one run type, 3 picks all.
    pub fn from_model(model: i64) -> Option<Self> {
        match model {
            3 => Some(RunSelection::All),
            m => RunType::from_index(m).map(RunSelection::Single),
        }
    }

    /// Run types to draw, top row first.
    pub fn run_types(self) -> Vec<RunType> {
        match self {
            RunSelection::Single(rt) => vec![rt],
            RunSelection::All => RunType::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// Continuum light curve path as written by PIXON.
    pub fcont: String,
    /// Emission-line light curve path.
    pub fline: String,
    /// Tag appended to every derived result file name.
    pub pixon_basis_type: String,
    pub selection: RunSelection,
}

impl Params {
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_file(&ParamFile::load(path)?)
    }

    pub fn from_file(file: &ParamFile) -> Result<Self> {
        let model_raw = file.require("drv_lc_model")?;
        let model: i64 = model_raw.parse().map_err(|_| {
            PlotError::config(
                &file.path,
                format!("drv_lc_model '{model_raw}' is not an integer"),
            )
        })?;
        let selection = RunSelection::from_model(model).ok_or_else(|| {
            PlotError::config(
                &file.path,
                format!("drv_lc_model must be 0, 1, 2 or 3, got {model}"),
            )
        })?;

        Ok(Params {
            fcont: file.require("fcont")?.to_string(),
            fline: file.require("fline")?.to_string(),
            pixon_basis_type: file.require("pixon_basis_type")?.to_string(),
            selection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<ParamFile> {
        ParamFile::parse(Path::new("param_input"), &format!("[dump]\n{text}"))
    }

    #[test]
    fn every_line_becomes_one_verbatim_entry() {
        let text = "fcont = data/con.txt\nfline=data/line.txt\npixon_basis_type = 1\ndrv_lc_model = 3\nfreal = a b c\n";
        let file = parse(text).unwrap();
        let dump = file.dump().unwrap();
        assert_eq!(dump.len(), 5);
        assert_eq!(dump.get("fcont"), Some(Some("data/con.txt")));
        assert_eq!(dump.get("fline"), Some(Some("data/line.txt")));
        assert_eq!(dump.get("freal"), Some(Some("a b c")));
    }

    #[test]
    fn only_the_first_equals_splits() {
        let file = parse("expr = a=b\n").unwrap();
        assert_eq!(file.require("expr").unwrap(), "a=b");
    }

    #[test]
    fn comments_bare_keys_and_case() {
        let file = parse("# comment\n; another\n\nFCont = x.txt\nflag\n").unwrap();
        let dump = file.dump().unwrap();
        assert_eq!(dump.len(), 2);
        assert_eq!(dump.get("fcont"), Some(Some("x.txt")));
        assert_eq!(dump.get("flag"), Some(None));
        assert!(matches!(
            file.require("flag").unwrap_err(),
            PlotError::ConfigParse { .. }
        ));
    }

    #[test]
    fn indented_lines_continue_the_value() {
        let file = parse("note = first\n  second\nnext = 1\n").unwrap();
        assert_eq!(file.require("note").unwrap(), "first\nsecond");
        assert_eq!(file.require("next").unwrap(), "1");
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            parse("= value\n").unwrap_err(),
            PlotError::ConfigParse { .. }
        ));
    }

    #[test]
    fn duplicate_key_is_rejected() {
        assert!(matches!(
            parse("a = 1\nA = 2\n").unwrap_err(),
            PlotError::ConfigParse { .. }
        ));
    }

    #[test]
    fn own_section_header_moves_keys_out_of_dump() {
        let file = parse("fcont = c.txt\n[other]\nfline = l.txt\n").unwrap();
        assert!(file.require("fline").is_err());
        assert_eq!(file.section("other").unwrap().get("fline"), Some(Some("l.txt")));
    }

    #[test]
    fn selection_from_drv_lc_model() {
        assert_eq!(
            RunSelection::from_model(3).unwrap().run_types(),
            vec![RunType::ContFix, RunType::Pixon, RunType::Drw]
        );
        assert_eq!(
            RunSelection::from_model(1).unwrap().run_types(),
            vec![RunType::Pixon]
        );
        assert!(RunSelection::from_model(4).is_none());
        assert!(RunSelection::from_model(-1).is_none());
    }

    #[test]
    fn typed_params_require_all_keys() {
        let file = parse("fcont = data/con.txt\nfline = data/line.txt\npixon_basis_type = 0\ndrv_lc_model = 2\n").unwrap();
        let params = Params::from_file(&file).unwrap();
        assert_eq!(params.selection, RunSelection::Single(RunType::Drw));
        assert_eq!(params.pixon_basis_type, "0");

        let partial = parse("fcont = c\nfline = l\ndrv_lc_model = 0\n").unwrap();
        assert!(Params::from_file(&partial).is_err());

        let bad = parse("fcont = c\nfline = l\npixon_basis_type = 0\ndrv_lc_model = two\n").unwrap();
        assert!(Params::from_file(&bad).is_err());
    }

    #[test]
    fn missing_param_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ParamFile::load(&dir.path().join("param_input")).unwrap_err();
        assert!(matches!(err, PlotError::ConfigParse { .. }));
    }
}
