use serde::{Deserialize, Serialize};

/// Millimetres per typographic point.
pub const PT_TO_MM: f32 = 25.4 / 72.0;

/// Font families available as PDF builtin fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    Helvetica,
    Times,
    Courier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

/// The part of a summary a line of text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRole {
    Title,
    Metadata,
    Body,
    BulletHeading,
    Bullet,
}

/// Typography for one text role.
///
/// `line_height` and `space_after` are millimetres; `font_size` is points.
/// `space_after` is added once after each unit of the role (the whole title,
/// each paragraph, each bullet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: FontFamily,
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub line_height: f32,
    pub space_after: f32,
}

impl TextStyle {
    pub fn new(font_family: FontFamily, font_size: f32, font_weight: FontWeight) -> Self {
        Self {
            font_family,
            font_size,
            font_weight,
            line_height: font_size * PT_TO_MM * 1.5,
            space_after: 0.0,
        }
    }

    pub fn line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    pub fn space_after(mut self, space_after: f32) -> Self {
        self.space_after = space_after;
        self
    }

    pub fn font_size_mm(&self) -> f32 {
        self.font_size * PT_TO_MM
    }
}

/// Style rules for every role of a summary document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSheet {
    pub title: TextStyle,
    pub metadata: TextStyle,
    pub body: TextStyle,
    pub bullet_heading: TextStyle,
    pub bullet: TextStyle,
}

impl StyleSheet {
    pub fn for_role(&self, role: TextRole) -> &TextStyle {
        match role {
            TextRole::Title => &self.title,
            TextRole::Metadata => &self.metadata,
            TextRole::Body => &self.body,
            TextRole::BulletHeading => &self.bullet_heading,
            TextRole::Bullet => &self.bullet,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextRole, &TextStyle)> {
        [
            (TextRole::Title, &self.title),
            (TextRole::Metadata, &self.metadata),
            (TextRole::Body, &self.body),
            (TextRole::BulletHeading, &self.bullet_heading),
            (TextRole::Bullet, &self.bullet),
        ]
        .into_iter()
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            title: TextStyle::new(FontFamily::Times, 20.0, FontWeight::Bold).line_height(10.0),
            metadata: TextStyle::new(FontFamily::Helvetica, 10.0, FontWeight::Normal)
                .line_height(5.0)
                .space_after(10.0),
            body: TextStyle::new(FontFamily::Times, 12.0, FontWeight::Normal)
                .line_height(7.0)
                .space_after(10.0),
            bullet_heading: TextStyle::new(FontFamily::Helvetica, 12.0, FontWeight::Bold)
                .line_height(8.0),
            bullet: TextStyle::new(FontFamily::Helvetica, 11.0, FontWeight::Normal)
                .line_height(6.0)
                .space_after(2.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_role_matches_fields() {
        let sheet = StyleSheet::default();
        assert_eq!(sheet.for_role(TextRole::Title), &sheet.title);
        assert_eq!(sheet.for_role(TextRole::Bullet), &sheet.bullet);
        assert_eq!(sheet.iter().count(), 5);
    }

    #[test]
    fn test_builder_overrides_line_height() {
        let style = TextStyle::new(FontFamily::Courier, 10.0, FontWeight::Normal)
            .line_height(4.0)
            .space_after(1.0);
        assert_eq!(style.line_height, 4.0);
        assert_eq!(style.space_after, 1.0);
    }
}
