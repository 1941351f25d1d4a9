//! Game record: one launchable library entry

use serde::{Deserialize, Serialize};

/// One entry in the library and its launch parameters.
///
/// Empty strings mean "not set" for every optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Game {
    /// Store app id as a decimal string, empty when no catalog match
    pub id: String,
    pub name: String,
    /// Windows executable handed to the runner
    pub exec_path: String,
    /// WINEPREFIX directory, empty for the runner default
    pub prefix: String,
    /// Directory name under compatibilitytools.d, empty for the runner default
    pub proton_ver: String,
    /// Local path of the cover art
    pub image_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dll_overrides: String,
}

/// User-editable fields of a game, used for both the add and the edit flow.
///
/// `id` is absent on purpose: it only ever comes from a catalog lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFields {
    pub name: String,
    pub exec_path: String,
    pub prefix: String,
    pub proton_ver: String,
    /// Cover art path as entered by the user (may be outside the images dir)
    pub image: String,
    pub dll_overrides: String,
}

impl Game {
    /// A game straight from user input, without catalog id or cover art.
    pub fn from_fields(fields: GameFields) -> Self {
        Self {
            id: String::new(),
            name: fields.name,
            exec_path: fields.exec_path,
            prefix: fields.prefix,
            proton_ver: fields.proton_ver,
            image_url: String::new(),
            dll_overrides: fields.dll_overrides,
        }
    }

    /// Current editable values, e.g. to prefill an edit form.
    pub fn fields(&self) -> GameFields {
        GameFields {
            name: self.name.clone(),
            exec_path: self.exec_path.clone(),
            prefix: self.prefix.clone(),
            proton_ver: self.proton_ver.clone(),
            image: self.image_url.clone(),
            dll_overrides: self.dll_overrides.clone(),
        }
    }

    pub fn has_catalog_id(&self) -> bool {
        !self.id.is_empty()
    }
}
