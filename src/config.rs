//! Configuration module for shortcuts, overlay colours and selection settings.
//! Stored as an INI file in the platform configuration directory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{debug, warn};

use crate::gesture::DEFAULT_MIN_ROI_SIZE;
use crate::layout::VerticalAlign;

const DEFAULT_CONFIG_INI: &str = include_str!("../config.ini");

/// Represents all possible input types for shortcuts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputBinding {
    Key(egui::Key),
    KeyWithCtrl(egui::Key),
    KeyWithShift(egui::Key),
    KeyWithAlt(egui::Key),
}

impl InputBinding {
    /// Binding produced by pressing `key` with `modifiers` held.
    /// Ctrl (or Cmd) wins over Shift, Shift over Alt.
    pub fn from_key_press(key: egui::Key, modifiers: egui::Modifiers) -> Self {
        if modifiers.command {
            InputBinding::KeyWithCtrl(key)
        } else if modifiers.shift {
            InputBinding::KeyWithShift(key)
        } else if modifiers.alt {
            InputBinding::KeyWithAlt(key)
        } else {
            InputBinding::Key(key)
        }
    }
}

/// All configurable actions in the ROI window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Discard the selection and leave
    Cancel,
    /// Submit the committed ROI for diagnosis
    Confirm,
    /// Close the window
    Exit,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Cancel, Action::Confirm, Action::Exit];

    pub fn from_str(s: &str) -> Option<Action> {
        match s.trim().to_lowercase().as_str() {
            "cancel" | "back" => Some(Action::Cancel),
            "confirm" | "start_diagnosis" | "submit" => Some(Action::Confirm),
            "exit" | "quit" | "close" => Some(Action::Exit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Cancel => "cancel",
            Action::Confirm => "confirm",
            Action::Exit => "exit",
        }
    }
}

/// Parse an input binding from string
pub fn parse_input_binding(s: &str) -> Option<InputBinding> {
    let s = s.trim().to_lowercase();

    if let Some(key_str) = s.strip_prefix("ctrl+") {
        return parse_key(key_str).map(InputBinding::KeyWithCtrl);
    }
    if let Some(key_str) = s.strip_prefix("shift+") {
        return parse_key(key_str).map(InputBinding::KeyWithShift);
    }
    if let Some(key_str) = s.strip_prefix("alt+") {
        return parse_key(key_str).map(InputBinding::KeyWithAlt);
    }

    parse_key(&s).map(InputBinding::Key)
}

/// Parse a single key from string
fn parse_key(s: &str) -> Option<egui::Key> {
    let key = match s.trim() {
        "escape" | "esc" => egui::Key::Escape,
        "enter" | "return" => egui::Key::Enter,
        "space" | "spacebar" => egui::Key::Space,
        "backspace" => egui::Key::Backspace,
        "delete" | "del" => egui::Key::Delete,
        "tab" => egui::Key::Tab,
        "q" => egui::Key::Q,
        "w" => egui::Key::W,
        "c" => egui::Key::C,
        "d" => egui::Key::D,
        "s" => egui::Key::S,
        "x" => egui::Key::X,
        "f1" => egui::Key::F1,
        "f2" => egui::Key::F2,
        other => egui::Key::from_name(other).or_else(|| {
            let mut chars = other.chars();
            let first = chars.next()?.to_uppercase().collect::<String>();
            egui::Key::from_name(&format!("{first}{}", chars.as_str()))
        })?,
    };
    Some(key)
}

/// Application configuration loaded from INI file
#[derive(Debug, Clone)]
pub struct Config {
    /// Map from input binding to action
    pub bindings: HashMap<InputBinding, Action>,
    /// Reverse map for looking up bindings for an action
    pub action_bindings: HashMap<Action, Vec<InputBinding>>,
    /// Releases must exceed this many native pixels on both sides
    pub min_roi_size: u32,
    /// Centre the frame vertically as well as horizontally
    pub center_vertically: bool,
    /// Share of the screen height used before the container is measured
    pub fallback_height_fraction: f32,
    /// Background color as RGB (0-255)
    pub background_rgb: [u8; 3],
    /// Rectangle border width in points
    pub stroke_width: f32,
    /// Border colour while drawing
    pub provisional_rgb: [u8; 3],
    /// Border colour once committed
    pub final_rgb: [u8; 3],
    /// Fill opacity (0-255) of the rectangle
    pub fill_alpha: u8,
    /// Where diagnosis requests are written; stdout when unset
    pub output_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Config {
            bindings: HashMap::new(),
            action_bindings: HashMap::new(),
            min_roi_size: DEFAULT_MIN_ROI_SIZE,
            center_vertically: false,
            fallback_height_fraction: 0.8,
            background_rgb: [0, 0, 0],
            stroke_width: 2.0,
            provisional_rgb: [0, 30, 87],
            final_rgb: [0, 255, 0],
            fill_alpha: 51,
            output_path: None,
        };
        config.set_defaults();
        config
    }
}

impl Config {
    /// Set default keybindings
    fn set_defaults(&mut self) {
        self.add_binding(InputBinding::Key(egui::Key::Escape), Action::Cancel);
        self.add_binding(InputBinding::Key(egui::Key::Enter), Action::Confirm);
        self.add_binding(InputBinding::KeyWithCtrl(egui::Key::W), Action::Exit);
    }

    /// Add a binding
    fn add_binding(&mut self, input: InputBinding, action: Action) {
        if let Some(previous) = self.bindings.insert(input.clone(), action) {
            if let Some(list) = self.action_bindings.get_mut(&previous) {
                list.retain(|b| b != &input);
            }
        }
        self.action_bindings.entry(action).or_default().push(input);
    }

    pub fn vertical_align(&self) -> VerticalAlign {
        VerticalAlign::from_center_flag(self.center_vertically)
    }

    /// Get the configuration directory, creating it if needed.
    fn config_dir() -> PathBuf {
        let dir = ProjectDirs::from("", "", "roi-tool")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!("could not create config dir {}: {e}", dir.display());
        }
        dir
    }

    /// Get settings file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.ini")
    }

    /// Load configuration from the default location.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, writing the template there first if
    /// the file does not exist yet.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            if let Err(e) = fs::write(path, DEFAULT_CONFIG_INI) {
                warn!("could not write default config to {}: {e}", path.display());
            }
            return Self::parse_ini(DEFAULT_CONFIG_INI);
        }

        match fs::read_to_string(path) {
            Ok(content) => {
                debug!("loaded config from {}", path.display());
                Self::parse_ini(&content)
            }
            Err(e) => {
                warn!("could not read {}: {e}, using defaults", path.display());
                Self::parse_ini(DEFAULT_CONFIG_INI)
            }
        }
    }

    /// Parse INI content into Config
    pub fn parse_ini(content: &str) -> Self {
        let mut config = Config::default();
        let mut shortcuts_seen = false;

        #[derive(PartialEq)]
        enum Section {
            None,
            Settings,
            Overlay,
            Shortcuts,
            Diagnosis,
        }
        let mut section = Section::None;

        for line in content.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = line[1..line.len() - 1].trim().to_lowercase();
                section = match name.as_str() {
                    "settings" => Section::Settings,
                    "overlay" => Section::Overlay,
                    "shortcuts" => Section::Shortcuts,
                    "diagnosis" => Section::Diagnosis,
                    _ => Section::None,
                };
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match section {
                Section::Shortcuts => {
                    if let Some(action) = Action::from_str(&key) {
                        if !shortcuts_seen {
                            // A [Shortcuts] section replaces the built-in bindings.
                            config.bindings.clear();
                            config.action_bindings.clear();
                            shortcuts_seen = true;
                        }
                        // Value can be comma-separated for multiple bindings
                        for binding_str in value.split(',') {
                            match parse_input_binding(binding_str) {
                                Some(binding) => config.add_binding(binding, action),
                                None => warn!("unknown shortcut '{}'", binding_str.trim()),
                            }
                        }
                    }
                }
                Section::Settings => match key.as_str() {
                    "min_roi_size" | "min_size" => {
                        if let Ok(v) = value.parse::<u32>() {
                            config.min_roi_size = v.min(10_000);
                        }
                    }
                    "center_vertically" => {
                        if let Some(v) = parse_bool(value) {
                            config.center_vertically = v;
                        }
                    }
                    "fallback_height_fraction" => {
                        if let Ok(v) = value.parse::<f32>() {
                            if v.is_finite() {
                                config.fallback_height_fraction = v.clamp(0.1, 1.0);
                            }
                        }
                    }
                    "background_rgb" => {
                        if let Some(rgb) = parse_rgb_triplet(value) {
                            config.background_rgb = rgb;
                        }
                    }
                    _ => {}
                },
                Section::Overlay => match key.as_str() {
                    "stroke_width" => {
                        if let Ok(v) = value.parse::<f32>() {
                            if v.is_finite() {
                                config.stroke_width = v.clamp(0.5, 10.0);
                            }
                        }
                    }
                    "provisional_rgb" | "drawing_rgb" => {
                        if let Some(rgb) = parse_rgb_triplet(value) {
                            config.provisional_rgb = rgb;
                        }
                    }
                    "final_rgb" | "selected_rgb" => {
                        if let Some(rgb) = parse_rgb_triplet(value) {
                            config.final_rgb = rgb;
                        }
                    }
                    "fill_alpha" => {
                        if let Ok(v) = value.parse::<u8>() {
                            config.fill_alpha = v;
                        }
                    }
                    _ => {}
                },
                Section::Diagnosis => {
                    if key == "output_path" {
                        config.output_path = if value.is_empty() || value.eq_ignore_ascii_case("stdout") {
                            None
                        } else {
                            Some(PathBuf::from(value))
                        };
                    }
                }
                Section::None => {}
            }
        }

        config
    }

    /// Serialize configuration to INI text
    pub fn to_ini(&self) -> String {
        let mut content = String::new();

        content.push_str("; ROI Tool Configuration\n\n");

        content.push_str("[Settings]\n");
        content.push_str("; Minimum ROI side in native video pixels (selections must be larger)\n");
        content.push_str(&format!("min_roi_size = {}\n", self.min_roi_size));
        content.push_str("; Centre the frame vertically in the window (true/false)\n");
        content.push_str(&format!("center_vertically = {}\n", self.center_vertically));
        content.push_str("; Share of the screen height used before the window is measured\n");
        content.push_str(&format!(
            "fallback_height_fraction = {}\n",
            self.fallback_height_fraction
        ));
        content.push_str(&format!(
            "background_rgb = {}\n\n",
            rgb_to_string(self.background_rgb)
        ));

        content.push_str("[Overlay]\n");
        content.push_str(&format!("stroke_width = {}\n", self.stroke_width));
        content.push_str(&format!(
            "provisional_rgb = {}\n",
            rgb_to_string(self.provisional_rgb)
        ));
        content.push_str(&format!("final_rgb = {}\n", rgb_to_string(self.final_rgb)));
        content.push_str(&format!("fill_alpha = {}\n\n", self.fill_alpha));

        content.push_str("[Shortcuts]\n");
        for action in Action::ALL {
            let bindings: Vec<String> = self
                .get_bindings(action)
                .iter()
                .map(binding_to_string)
                .collect();
            content.push_str(&format!("{} = {}\n", action.as_str(), bindings.join(", ")));
        }

        content.push_str("\n[Diagnosis]\n");
        content.push_str("; File that receives diagnosis requests (one JSON object per line); empty = stdout\n");
        content.push_str(&format!(
            "output_path = {}\n",
            self.output_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        ));

        content
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, self.to_ini())
    }

    /// Action bound to `input`, if any
    pub fn action_for(&self, input: &InputBinding) -> Option<Action> {
        self.bindings.get(input).copied()
    }

    /// Get all bindings for an action
    pub fn get_bindings(&self, action: Action) -> Vec<InputBinding> {
        self.action_bindings
            .get(&action)
            .cloned()
            .unwrap_or_default()
    }
}

/// Convert InputBinding back to string representation
fn binding_to_string(binding: &InputBinding) -> String {
    match binding {
        InputBinding::Key(key) => key_to_string(key),
        InputBinding::KeyWithCtrl(key) => format!("ctrl+{}", key_to_string(key)),
        InputBinding::KeyWithShift(key) => format!("shift+{}", key_to_string(key)),
        InputBinding::KeyWithAlt(key) => format!("alt+{}", key_to_string(key)),
    }
}

fn key_to_string(key: &egui::Key) -> String {
    key.name().to_lowercase()
}

fn rgb_to_string(rgb: [u8; 3]) -> String {
    format!("{}, {}, {}", rgb[0], rgb[1], rgb[2])
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn parse_rgb_triplet(value: &str) -> Option<[u8; 3]> {
    let parts: Vec<&str> = value
        .split(',')
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 {
        return None;
    }
    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;
    Some([r, g, b])
}
