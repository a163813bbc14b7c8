use crate::common::constants::GRID_FILE_NAME;
use crate::domain::{SirError, SirResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const GRID_FILE_HEADER: [&str; 7] = [
    "IMPORTANT: a) All items must be separated by commas.                 ",
    "           b) The first six characters of the last line                ",
    "          in the header (if any) must contain the symbol ---       ",
    "",
    "Line and blends indices   :   Initial lambda     Step     Final lambda ",
    "(in this order)                    (mA)          (mA)         (mA)     ",
    "-----------------------------------------------------------------------",
];

/// One synthesized wavelength region: the lines (and blends) it contains and
/// its wavelength sampling in mA relative to the line center.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawLineGroup", into = "RawLineGroup")]
pub struct LineGroup {
    indices: String,
    line_indices: Vec<u32>,
    start: f64,
    step: f64,
    end: f64,
}

impl LineGroup {
    pub fn new(indices: impl Into<String>, start: f64, step: f64, end: f64) -> SirResult<Self> {
        let indices = indices.into().trim().to_string();
        let line_indices = parse_line_indices(&indices)?;

        for (name, value) in [("start", start), ("step", step), ("end", end)] {
            if !value.is_finite() {
                return Err(SirError::parse(
                    "PARSE.WAVELENGTH",
                    format!("{name} wavelength of group '{indices}' must be finite, got {value}"),
                ));
            }
        }
        if step == 0.0 {
            return Err(SirError::parse(
                "PARSE.WAVELENGTH_STEP",
                format!("wavelength step of group '{indices}' must be non-zero"),
            ));
        }

        Ok(Self {
            indices,
            line_indices,
            start,
            step,
            end,
        })
    }

    pub fn indices(&self) -> &str {
        &self.indices
    }

    pub fn line_indices(&self) -> &[u32] {
        &self.line_indices
    }

    pub fn line_count(&self) -> usize {
        self.line_indices.len()
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    fn grid_line(&self) -> String {
        format!(
            "{}    :  {}, {}, {}",
            self.indices,
            format_grid_number(self.start),
            format_grid_number(self.step),
            format_grid_number(self.end)
        )
    }
}

/// Parses `INDICES:START,STEP,END`, e.g. `1,2:-500,10,1500`.
impl FromStr for LineGroup {
    type Err = SirError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let (indices, sampling) = source.split_once(':').ok_or_else(|| {
            SirError::parse(
                "PARSE.LINE_GROUP",
                format!("line group '{source}' must look like 'INDICES:START,STEP,END'"),
            )
        })?;

        let fields: Vec<&str> = sampling.split(',').map(str::trim).collect();
        let [start, step, end] = fields.as_slice() else {
            return Err(SirError::parse(
                "PARSE.LINE_GROUP",
                format!(
                    "line group '{source}' needs exactly three wavelength fields, got {}",
                    fields.len()
                ),
            ));
        };

        let parse_field = |field: &str| {
            field.parse::<f64>().map_err(|_| {
                SirError::parse(
                    "PARSE.WAVELENGTH",
                    format!("invalid wavelength '{field}' in line group '{source}'"),
                )
            })
        };

        Self::new(
            indices,
            parse_field(*start)?,
            parse_field(*step)?,
            parse_field(*end)?,
        )
    }
}

#[derive(Deserialize, Serialize)]
struct RawLineGroup(String, f64, f64, f64);

impl TryFrom<RawLineGroup> for LineGroup {
    type Error = SirError;

    fn try_from(raw: RawLineGroup) -> Result<Self, Self::Error> {
        Self::new(raw.0, raw.1, raw.2, raw.3)
    }
}

impl From<LineGroup> for RawLineGroup {
    fn from(group: LineGroup) -> Self {
        Self(group.indices, group.start, group.step, group.end)
    }
}

/// Ordered line groups of a session; fixed once the session is initialized.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LineGrid {
    groups: Vec<LineGroup>,
}

impl LineGrid {
    pub fn new(groups: Vec<LineGroup>) -> SirResult<Self> {
        if groups.is_empty() {
            return Err(SirError::parse(
                "PARSE.LINE_GRID",
                "at least one line group is required",
            ));
        }
        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[LineGroup] {
        &self.groups
    }

    /// Total number of lines over all groups, blends included.
    pub fn line_count(&self) -> usize {
        self.groups.iter().map(LineGroup::line_count).sum()
    }

    /// Text of the `malla.grid` file read by the engine.
    pub fn render(&self) -> String {
        let mut rendered = String::new();
        for line in GRID_FILE_HEADER {
            rendered.push_str(line);
            rendered.push('\n');
        }
        for group in &self.groups {
            rendered.push_str(&group.grid_line());
            rendered.push('\n');
        }
        rendered
    }

    pub fn write_to(&self, directory: &Path) -> SirResult<PathBuf> {
        let path = directory.join(GRID_FILE_NAME);
        fs::write(&path, self.render()).map_err(|source| {
            SirError::io_system(
                "IO.GRID_FILE",
                format!("failed to write line grid '{}': {}", path.display(), source),
            )
        })?;
        Ok(path)
    }
}

fn parse_line_indices(indices: &str) -> SirResult<Vec<u32>> {
    if indices.is_empty() {
        return Err(SirError::parse(
            "PARSE.LINE_INDEX",
            "line group must name at least one line index",
        ));
    }

    indices
        .split(',')
        .map(str::trim)
        .map(|token| match token.parse::<u32>() {
            Ok(index) if index > 0 => Ok(index),
            _ => Err(SirError::parse(
                "PARSE.LINE_INDEX",
                format!("invalid line index '{token}' in '{indices}'"),
            )),
        })
        .collect()
}

/// Integral values keep one decimal (`-500.0`), everything else uses the
/// shortest round-trip representation. Grid files written elsewhere may carry
/// bare integers (`-3500, 10, 3500`); the engine reads both forms.
fn format_grid_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1.0e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::{LineGrid, LineGroup, format_grid_number};
    use crate::domain::SirErrorCategory;
    use tempfile::TempDir;

    #[test]
    fn line_count_sums_comma_separated_indices() {
        let grid = LineGrid::new(vec![
            LineGroup::new("1", -500.0, 10.0, 1500.0).expect("group"),
            LineGroup::new("2,3,4", -750.0, 10.0, 1300.0).expect("group"),
        ])
        .expect("grid");
        assert_eq!(grid.line_count(), 4);
        assert_eq!(grid.groups()[1].line_indices(), &[2, 3, 4]);
    }

    #[test]
    fn renders_header_and_group_lines() {
        let grid = LineGrid::new(vec![
            LineGroup::new("200,201", -500.0, 10.0, 1500.0).expect("group"),
            LineGroup::new("300", -3500.0, 12.5, 3500.0).expect("group"),
        ])
        .expect("grid");

        let rendered = grid.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("IMPORTANT: a) All items must be separated by commas."));
        assert_eq!(lines[3], "");
        assert!(lines[6].starts_with("---"));
        assert_eq!(lines[7], "200,201    :  -500.0, 10.0, 1500.0");
        assert_eq!(lines[8], "300    :  -3500.0, 12.5, 3500.0");
    }

    #[test]
    fn parses_command_line_group_syntax() {
        let group: LineGroup = "1, 2 : -500, 10, 1500".parse().expect("group");
        assert_eq!(group.indices(), "1, 2");
        assert_eq!(group.line_count(), 2);
        assert_eq!((group.start(), group.step(), group.end()), (-500.0, 10.0, 1500.0));

        let error = "1:-500,10".parse::<LineGroup>().expect_err("missing field");
        assert_eq!(error.placeholder(), "PARSE.LINE_GROUP");
    }

    #[test]
    fn malformed_indices_are_parse_errors() {
        for indices in ["", "a", "1,,2", "0", "1;2"] {
            let error = LineGroup::new(indices, -500.0, 10.0, 1500.0).expect_err(indices);
            assert_eq!(error.category(), SirErrorCategory::ParseError);
            assert_eq!(error.placeholder(), "PARSE.LINE_INDEX");
        }

        let error = LineGroup::new("1", -500.0, 0.0, 1500.0).expect_err("zero step");
        assert_eq!(error.placeholder(), "PARSE.WAVELENGTH_STEP");
        assert!(LineGrid::new(Vec::new()).is_err());
    }

    #[test]
    fn deserializes_groups_as_tuples() {
        let grid: LineGrid =
            serde_json::from_str(r#"{ "groups": [["1", -500.0, 10.0, 1500.0]] }"#).expect("grid");
        assert_eq!(grid.line_count(), 1);

        let error = serde_json::from_str::<LineGrid>(r#"{ "groups": [["x", 0.0, 1.0, 2.0]] }"#);
        assert!(error.is_err());
    }

    #[test]
    fn writes_grid_file_into_directory() {
        let temp = TempDir::new().expect("tempdir");
        let grid = LineGrid::new(vec![LineGroup::new("1", -500.0, 10.0, 1500.0).expect("group")])
            .expect("grid");

        let path = grid.write_to(temp.path()).expect("write grid");
        assert!(path.ends_with("malla.grid"));
        let content = std::fs::read_to_string(path).expect("read grid");
        assert!(content.ends_with("1    :  -500.0, 10.0, 1500.0\n"));
    }

    #[test]
    fn grid_numbers_keep_a_decimal_for_integral_values() {
        assert_eq!(format_grid_number(-500.0), "-500.0");
        assert_eq!(format_grid_number(-3500.0), "-3500.0");
        assert_eq!(format_grid_number(12.5), "12.5");
        assert_eq!(format_grid_number(0.1), "0.1");
    }
}
