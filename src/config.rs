use anyhow::{Result, anyhow};
use directories::UserDirs;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    pub name: Option<String>,
}

/// Hard limits applied to every committed transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub min_scale: f64,
    pub max_scale: f64,
    pub min_aspect: f64,
    pub max_aspect: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_scale: 0.33,
            max_scale: 2.0,
            min_aspect: 0.5,
            max_aspect: 2.0,
        }
    }
}

/// Thresholds for the pinch vector classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Movement (screen units, dominant axis) at or below which a pinch counts as small.
    pub min_movement: f64,
    /// Half-width of the vertical / horizontal cones, in degrees.
    pub vh_degrees: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_movement: 20.0,
            vh_degrees: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsMode {
    #[default]
    Unconstrained,
    ClampToReference,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleAccumulation {
    /// Each gesture multiplies onto the scale committed by earlier gestures.
    #[default]
    Compound,
    /// Each gesture measures its scale from 1.0.
    PerGesture,
}

/// `draggable = true` or `draggable = { x = true, y = false }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisToggle {
    All(bool),
    Axes { x: bool, y: bool },
}

impl Default for AxisToggle {
    fn default() -> Self {
        AxisToggle::All(true)
    }
}

impl AxisToggle {
    pub fn x(&self) -> bool {
        match *self {
            AxisToggle::All(b) => b,
            AxisToggle::Axes { x, .. } => x,
        }
    }
    pub fn y(&self) -> bool {
        match *self {
            AxisToggle::All(b) => b,
            AxisToggle::Axes { y, .. } => y,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Behavior {
    pub bounds: BoundsMode,
    pub scale_accumulation: ScaleAccumulation,
    /// Release the direction lock whenever a pinch sample is small again.
    pub relock_on_small: bool,
    pub rotatable: bool,
    pub scalable: bool,
    pub draggable: AxisToggle,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            bounds: BoundsMode::default(),
            scale_accumulation: ScaleAccumulation::default(),
            relock_on_small: true,
            rotatable: true,
            scalable: true,
            draggable: AxisToggle::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub meta: Meta,
    pub limits: Limits,
    pub classifier: ClassifierConfig,
    pub behavior: Behavior,
}

impl Profile {
    /// The profile shipped inside the binary.
    pub fn builtin() -> Result<Self> {
        Self::parse(default_profile_text(), Path::new("<builtin>"))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path)
            .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
        Self::parse(&txt, path)
    }

    fn parse(txt: &str, origin: &Path) -> Result<Self> {
        let profile: Profile = toml::from_str(txt)
            .map_err(|e| anyhow!("failed to parse {}: {e}", origin.display()))?;
        validate_profile(&profile)?;
        Ok(profile)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigState {
    pub active_name: String,
    pub profile: Profile,
    pub config_dir: PathBuf,
    pub profiles_dir: PathBuf,
    pub active_ptr: PathBuf,
}

fn config_dir() -> Result<PathBuf> {
    let dirs = UserDirs::new().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(dirs.home_dir().join(".config").join("pinchframe"))
}

fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

impl ConfigState {
    pub fn load_or_install_default() -> Result<Self> {
        Self::load_or_install_in(config_dir()?)
    }

    /// Same as [`ConfigState::load_or_install_default`] but rooted at `cfgdir`.
    pub fn load_or_install_in(cfgdir: PathBuf) -> Result<Self> {
        let profdir = cfgdir.join("profiles");
        fs::create_dir_all(&profdir)?;

        let def_path = profdir.join("default.toml");
        if !def_path.exists() {
            fs::write(&def_path, default_profile_text())?;
            info!("installed default profile at {}", def_path.display());
        }

        let active_ptr = cfgdir.join("active");
        if !active_ptr.exists() {
            let mut f = fs::File::create(&active_ptr)?;
            f.write_all(b"default")?;
        }

        let active_name = fs::read_to_string(&active_ptr)?.trim().to_string();
        let profile = Profile::from_file(&profdir.join(format!("{active_name}.toml")))?;

        Ok(Self {
            active_name,
            profile,
            config_dir: cfgdir,
            profiles_dir: profdir,
            active_ptr,
        })
    }

    pub fn set_active(&mut self, name: &str) -> Result<()> {
        let p = self.profile_path(name);
        if !p.exists() {
            return Err(anyhow!("profile not found: {}", p.display()));
        }
        self.profile = self.load_profile(name)?;
        fs::write(&self.active_ptr, name.as_bytes())?;
        self.active_name = name.to_string();
        info!("active profile is now '{name}'");
        Ok(())
    }

    pub fn list_profiles(&self) -> Vec<String> {
        let mut v = Vec::new();
        if let Ok(rd) = fs::read_dir(&self.profiles_dir) {
            for e in rd.flatten() {
                let path = e.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        v.push(stem.to_string());
                    }
                }
            }
        }
        v.sort();
        v
    }

    pub fn load_profile(&self, name: &str) -> Result<Profile> {
        Profile::from_file(&self.profile_path(name))
    }

    fn profile_path(&self, name: &str) -> PathBuf {
        self.profiles_dir.join(format!("{name}.toml"))
    }

    pub fn report(&self) -> serde_json::Value {
        serde_json::json!({
            "config_dir": self.config_dir,
            "profiles_dir": self.profiles_dir,
            "active_profile": self.active_name,
            "profile": self.profile,
        })
    }
}

fn validate_profile(p: &Profile) -> Result<()> {
    let l = &p.limits;
    if !(l.min_scale > 0.0) || !l.max_scale.is_finite() || l.min_scale > l.max_scale {
        return Err(anyhow!(
            "limits.min_scale/max_scale must satisfy 0 < min <= max (got {} / {})",
            l.min_scale,
            l.max_scale
        ));
    }
    if !(l.min_aspect > 0.0) || !l.max_aspect.is_finite() || l.min_aspect > l.max_aspect {
        return Err(anyhow!(
            "limits.min_aspect/max_aspect must satisfy 0 < min <= max (got {} / {})",
            l.min_aspect,
            l.max_aspect
        ));
    }
    let c = &p.classifier;
    if !(c.vh_degrees > 0.0 && c.vh_degrees < 45.0) {
        return Err(anyhow!("classifier.vh_degrees must be in (0, 45)"));
    }
    if !(c.min_movement >= 0.0) {
        return Err(anyhow!("classifier.min_movement must be non-negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profile_matches_defaults() {
        let p = Profile::builtin().unwrap();
        assert_eq!(p.meta.name.as_deref(), Some("default"));
        assert_eq!(p.limits.min_scale, 0.33);
        assert_eq!(p.limits.max_scale, 2.0);
        assert_eq!(p.classifier.min_movement, 20.0);
        assert_eq!(p.behavior.bounds, BoundsMode::Unconstrained);
        assert_eq!(p.behavior.scale_accumulation, ScaleAccumulation::Compound);
        assert!(p.behavior.relock_on_small);
    }

    #[test]
    fn partial_profile_fills_defaults() {
        let p: Profile = toml::from_str(
            r#"
            [behavior]
            bounds = "clamp_to_reference"
            draggable = { x = true, y = false }
            "#,
        )
        .unwrap();
        assert_eq!(p.behavior.bounds, BoundsMode::ClampToReference);
        assert!(p.behavior.draggable.x());
        assert!(!p.behavior.draggable.y());
        assert_eq!(p.limits.max_aspect, 2.0);
        assert!(p.behavior.scalable);
    }

    #[test]
    fn draggable_accepts_plain_bool() {
        let p: Profile = toml::from_str("[behavior]\ndraggable = false\n").unwrap();
        assert!(!p.behavior.draggable.x());
        assert!(!p.behavior.draggable.y());
    }

    #[test]
    fn inverted_scale_limits_are_rejected() {
        let p: Profile = toml::from_str("[limits]\nmin_scale = 3.0\nmax_scale = 2.0\n").unwrap();
        assert!(validate_profile(&p).is_err());
    }

    #[test]
    fn cone_angle_must_be_below_45() {
        let p: Profile = toml::from_str("[classifier]\nvh_degrees = 50.0\n").unwrap();
        assert!(validate_profile(&p).is_err());
    }

    #[test]
    fn install_list_and_switch_profiles() {
        let dir = std::env::temp_dir().join(format!("pinchframe-cfg-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let mut st = ConfigState::load_or_install_in(dir.clone()).unwrap();
        assert_eq!(st.active_name, "default");
        assert_eq!(st.list_profiles(), vec!["default".to_string()]);

        fs::write(
            st.profiles_dir.join("tight.toml"),
            "[behavior]\nbounds = \"clamp_to_reference\"\n",
        )
        .unwrap();
        st.set_active("tight").unwrap();
        assert_eq!(st.profile.behavior.bounds, BoundsMode::ClampToReference);
        assert_eq!(fs::read_to_string(&st.active_ptr).unwrap(), "tight");
        assert!(st.set_active("missing").is_err());

        let again = ConfigState::load_or_install_in(dir.clone()).unwrap();
        assert_eq!(again.active_name, "tight");
        let _ = fs::remove_dir_all(&dir);
    }
}
