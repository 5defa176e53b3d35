use crate::Result;
use crate::state::DisplayOption;
use std::path::Path;

pub(crate) mod script;

pub use script::ScriptSetter;

/// Applies a picture as desktop background.
pub trait WallpaperSetter {
    fn set_wallpaper(&self, path: &Path, option: DisplayOption) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Desktop {
    /// Any window manager, using feh
    #[cfg_attr(feature = "cli", value(name = "barewm"))]
    BareWm,
    Gnome,
    Lxde,
}

const SET_SCRIPT_BARE_WM: &str = r#"#!/bin/sh
if test "$WALLPAPER_OPTIONS" = zoom; then
	feh --bg-fill "$WALLPAPER"
else
	feh --bg-max "$WALLPAPER"
fi
"#;

const SET_SCRIPT_LXDE: &str = r#"#!/bin/sh
if test "$WALLPAPER_OPTIONS" = zoom; then
	pcmanfm --set-wallpaper="$WALLPAPER" --wallpaper-mode=crop
else
	pcmanfm --set-wallpaper="$WALLPAPER" --wallpaper-mode=fit
fi
"#;

const SET_SCRIPT_GNOME: &str = r#"#!/bin/sh
gsettings set org.gnome.desktop.background picture-uri "file://$WALLPAPER"
if test "$WALLPAPER_OPTIONS" = zoom; then
	gsettings set org.gnome.desktop.background picture-options zoom
else
	gsettings set org.gnome.desktop.background picture-options scaled
fi
gsettings set org.gnome.desktop.background primary-color "000000"
gsettings set org.gnome.desktop.background secondary-color "000000"
"#;

impl Desktop {
    pub fn set_script(&self) -> &'static str {
        match self {
            Desktop::BareWm => SET_SCRIPT_BARE_WM,
            Desktop::Gnome => SET_SCRIPT_GNOME,
            Desktop::Lxde => SET_SCRIPT_LXDE,
        }
    }

    /// LXDE does not run `--login` on its own, it gets an autostart entry.
    pub fn needs_autostart(&self) -> bool {
        matches!(self, Desktop::Lxde)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Desktop::BareWm => "barewm",
            Desktop::Gnome => "gnome",
            Desktop::Lxde => "lxde",
        }
    }
}
