//! Table visual format
//!
//! Default colors and the cell width policy applied when a table is created
//! or reformatted. The width bands are fixed product policy: up to four
//! columns get the widest cells, up to six the medium width, anything wider
//! the narrow width.

use serde::{Deserialize, Serialize};

/// Table-level visual format.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TableFormat {
    pub background_color: String,
    pub border_color: String,
}

impl Default for TableFormat {
    fn default() -> Self {
        TableFormat {
            background_color: "#FFF".to_string(),
            border_color: "#ABABAB".to_string(),
        }
    }
}

/// Default cell width for a table with the given column count.
pub fn cell_width_for_columns(columns: usize) -> &'static str {
    if columns <= 4 {
        "120px"
    } else if columns <= 6 {
        "100px"
    } else {
        "70px"
    }
}
