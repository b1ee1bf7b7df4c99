use serde::{
  Deserialize,
  Serialize
};

/// Colors and fonts for every part of the
/// widget.
///
/// Every field has a default, so a theme
/// file only needs the keys it changes.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct Theme {
  pub text_color:         TextColor,
  pub selection_color:    String,
  pub today_color:        String,
  pub weekday_color:      String,
  pub weekday_text_color: String,
  pub weekday_padding:    String,
  pub weekday_header_border_bottom:
    String,
  pub header_color:       String,
  pub floating_nav:       FloatingNav,
  pub calendar_container:
    ContainerFont,
  pub month:              Background,
  pub day_enabled:        Background,
  pub day_selected:       Background,
  /// Backdrop of the fast-scroll month
  /// label; transparent when unset.
  pub overlay_color:      Option<String>
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct TextColor {
  pub default: String,
  pub active:  String
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct FloatingNav {
  pub background: String,
  pub color:      String,
  pub chevron:    String
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct ContainerFont {
  pub font_family: String,
  pub font_size:   String
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct Background {
  pub background: String
}

impl Default for TextColor {
  fn default() -> Self {
    Self {
      default: "#333".to_string(),
      active:  "#FFF".to_string()
    }
  }
}

impl Default for FloatingNav {
  fn default() -> Self {
    Self {
      background: "rgba(56, 87, 138, \
                   0.94)"
        .to_string(),
      color:      "#FFF".to_string(),
      chevron:    "#FFA726".to_string()
    }
  }
}

impl Default for ContainerFont {
  fn default() -> Self {
    Self {
      font_family: "\"Trade Gothic\", \
                    sans-serif"
        .to_string(),
      font_size:   "1rem".to_string()
    }
  }
}

impl Default for Background {
  fn default() -> Self {
    Self {
      background: "#fff".to_string()
    }
  }
}

impl Default for Theme {
  fn default() -> Self {
    Self {
      text_color: TextColor::default(),
      selection_color: "#559FFF"
        .to_string(),
      today_color: "#FFA726".to_string(),
      weekday_color: "#559FFF"
        .to_string(),
      weekday_text_color: "#13c9b7"
        .to_string(),
      weekday_padding: "0".to_string(),
      weekday_header_border_bottom:
        "1px solid #7dfad2".to_string(),
      header_color: "#448AFF".to_string(),
      floating_nav: FloatingNav::default(),
      calendar_container:
        ContainerFont::default(),
      month: Background {
        background:
          "repeating-linear-gradient(45deg, \
           #f2f2f2, #f2f2f2 1px, #fff \
           2px, #fff 10px)"
            .to_string()
      },
      day_enabled: Background::default(),
      day_selected: Background {
        background: "linear-gradient(90deg, \
                     #befce8, #7dfad2)"
          .to_string()
      },
      overlay_color: None
    }
  }
}
