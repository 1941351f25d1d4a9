use std::{path::PathBuf, sync::LazyLock};

pub static DEFAULT_FRONT_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    if let Some(custom) = std::env::var_os("UMU_FRONT_PATH") {
        return PathBuf::from(custom);
    }

    let mut path = dirs::home_dir().unwrap_or_default();
    path.push(".config");
    path.push("umu-front");
    path
});

/// Computes a path inside the umu-front data directory.
///
/// Returns a `&Path` referencing the data directory itself if no arguments are passed in, or a
/// `PathBuf` created by joining all of the arguments to the data directory if at least one
/// argument is passed in.
///
/// # Examples
///
/// ```ignore
/// // Assuming `UMU_FRONT_PATH` is not set, the data directory is ~/.config/umu-front
/// assert_eq!(front_path!("games.json"), dirs::home_dir().unwrap().join(".config/umu-front/games.json"));
/// ```
#[macro_export]
macro_rules! front_path {
    () => {
        $crate::paths::DEFAULT_FRONT_PATH.as_path()
    };

    ( $( $path:expr ),+ $(,)? ) => {
        [
            $crate::paths::DEFAULT_FRONT_PATH.as_path(),
            $( std::path::Path::new(&$path) ),+
        ].into_iter().collect::<std::path::PathBuf>()
    };
}

/// The user's home directory, used for compat-tool resolution.
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
        .unwrap_or_default()
}
