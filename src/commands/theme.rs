use anyhow::{anyhow, Result};

use crate::models::Theme;
use crate::theme::ThemeStore;

/// With no argument prints the current theme; `toggle` flips it; `light` or
/// `dark` sets it.
pub fn run(themes: &ThemeStore, choice: Option<&str>) -> Result<Theme> {
    let theme = match choice.map(str::trim) {
        None => {
            let current = themes.get()?;
            println!("Theme: {}", current.as_str());
            return Ok(current);
        }
        Some(value) if value.eq_ignore_ascii_case("toggle") => themes.toggle()?,
        Some(value) => {
            let theme: Theme = value.parse().map_err(|e: String| anyhow!(e))?;
            themes.set(theme)?;
            theme
        }
    };

    println!("Theme set to {}", theme.as_str());
    Ok(theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::*;

    #[test]
    fn test_show_default() {
        let (db, _dir) = setup_test_db();
        let themes = ThemeStore::new(&db);
        assert_eq!(run(&themes, None).unwrap(), Theme::Light);
    }

    #[test]
    fn test_toggle_and_set() {
        let (db, _dir) = setup_test_db();
        let themes = ThemeStore::new(&db);

        assert_eq!(run(&themes, Some("toggle")).unwrap(), Theme::Dark);
        assert_eq!(themes.get().unwrap(), Theme::Dark);
        assert_eq!(run(&themes, Some("light")).unwrap(), Theme::Light);
        assert_eq!(themes.get().unwrap(), Theme::Light);
    }

    #[test]
    fn test_unknown_theme() {
        let (db, _dir) = setup_test_db();
        let themes = ThemeStore::new(&db);
        let err = run(&themes, Some("sepia")).unwrap_err();
        assert!(err.to_string().contains("Invalid theme"));
        assert_eq!(themes.get().unwrap(), Theme::Light);
    }
}
