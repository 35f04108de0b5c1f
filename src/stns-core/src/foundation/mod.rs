use crate::error::foundation::GetUserHomeError;
use crate::error::foundation::GetUserHomeError::NoHomeInEnvironment;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub fn get_user_home() -> Result<OsString, GetUserHomeError> {
    std::env::var_os("HOME").ok_or(NoHomeInEnvironment())
}

/// Replaces a leading `~` component with the current user's home directory.
pub fn expand_home(path: &Path) -> Result<PathBuf, GetUserHomeError> {
    match path.strip_prefix("~") {
        Ok(rest) => Ok(PathBuf::from(get_user_home()?).join(rest)),
        Err(_) => Ok(path.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_home_leaves_absolute_paths_alone() {
        let path = Path::new("/etc/stns/id_rsa");
        assert_eq!(expand_home(path).unwrap(), path);
    }

    #[test]
    fn expand_home_only_touches_a_leading_tilde_component() {
        let path = Path::new("keys/~/id_rsa");
        assert_eq!(expand_home(path).unwrap(), path);
        let path = Path::new("~user/id_rsa");
        assert_eq!(expand_home(path).unwrap(), path);
    }

    #[test]
    fn expand_home_replaces_tilde() {
        let home = PathBuf::from(get_user_home().unwrap());
        assert_eq!(
            expand_home(Path::new("~/.ssh/id_rsa")).unwrap(),
            home.join(".ssh/id_rsa")
        );
    }
}
