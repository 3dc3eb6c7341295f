use iced::{Background, Border, Color, Theme, Vector};

#[derive(Debug, Clone, Copy)]
pub(crate) struct TabStyle {
    pub(crate) active: bool,
}

impl iced::widget::button::StyleSheet for TabStyle {
    type Style = Theme;

    fn active(&self, style: &Self::Style) -> iced::widget::button::Appearance {
        let palette = style.extended_palette();
        let (background, text_color) = if self.active {
            (palette.background.base.color, palette.background.base.text)
        } else {
            (palette.background.weak.color, palette.background.weak.text)
        };

        iced::widget::button::Appearance {
            background: Some(Background::Color(background)),
            text_color,
            border: Border {
                color: palette.background.strong.color,
                width: 1.0,
                radius: [8.0, 8.0, 0.0, 0.0].into(),
            },
            shadow_offset: if self.active {
                Vector::new(0.0, 0.0)
            } else {
                Vector::new(0.0, 1.0)
            },
            ..iced::widget::button::Appearance::default()
        }
    }

    fn hovered(&self, style: &Self::Style) -> iced::widget::button::Appearance {
        let mut appearance = self.active(style);
        if !self.active {
            if let Some(Background::Color(color)) = appearance.background {
                appearance.background = Some(Background::Color(lift(color, 0.05)));
            }
        }
        appearance
    }
}

/// Flat, full-width table row. The selected row is tinted.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RowStyle {
    pub(crate) selected: bool,
}

impl iced::widget::button::StyleSheet for RowStyle {
    type Style = Theme;

    fn active(&self, style: &Self::Style) -> iced::widget::button::Appearance {
        let palette = style.extended_palette();
        let background = if self.selected {
            Some(Background::Color(palette.primary.weak.color))
        } else {
            None
        };

        iced::widget::button::Appearance {
            background,
            text_color: palette.background.base.text,
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: 4.0.into(),
            },
            shadow_offset: Vector::new(0.0, 0.0),
            ..iced::widget::button::Appearance::default()
        }
    }

    fn hovered(&self, style: &Self::Style) -> iced::widget::button::Appearance {
        let mut appearance = self.active(style);
        if !self.selected {
            let palette = style.extended_palette();
            appearance.background = Some(Background::Color(palette.background.weak.color));
        }
        appearance
    }
}

/// Summary card with an accent stripe colour on the border.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CardStyle {
    pub(crate) accent: Color,
}

impl iced::widget::container::StyleSheet for CardStyle {
    type Style = Theme;

    fn appearance(&self, style: &Self::Style) -> iced::widget::container::Appearance {
        let palette = style.extended_palette();
        iced::widget::container::Appearance {
            text_color: Some(palette.background.base.text),
            background: Some(Background::Color(palette.background.base.color)),
            border: Border {
                color: self.accent,
                width: 1.5,
                radius: 8.0.into(),
            },
            ..iced::widget::container::Appearance::default()
        }
    }
}

fn lift(color: Color, amount: f32) -> Color {
    Color {
        r: (color.r + amount).min(1.0),
        g: (color.g + amount).min(1.0),
        b: (color.b + amount).min(1.0),
        a: color.a,
    }
}
