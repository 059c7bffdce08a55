use serde::{Deserialize, Serialize};

/// Selectable values for the edit form
///
/// Admin sessions get all four lists; non-admin sessions only get the
/// language list. A failed catalog query degrades to an empty list rather
/// than failing the whole render.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Catalogs {
    pub packages: Vec<String>,
    pub templates: Vec<String>,
    pub shells: Vec<String>,
    pub languages: Vec<String>,
}
