use eframe::egui::{self, Color32, CornerRadius, Frame, Margin, RichText, Stroke, Ui};

const INFO_FILL: Color32 = Color32::from_rgb(225, 238, 252);
const INFO_TEXT: Color32 = Color32::from_rgb(13, 59, 102);
const WARNING_FILL: Color32 = Color32::from_rgb(255, 244, 214);
const WARNING_TEXT: Color32 = Color32::from_rgb(122, 82, 0);

fn callout(ui: &mut Ui, fill: Color32, text_color: Color32, add_contents: impl FnOnce(&mut Ui)) {
    Frame::new()
        .fill(fill)
        .corner_radius(CornerRadius::same(6))
        .inner_margin(Margin::same(12))
        .stroke(Stroke::new(1.0, text_color.gamma_multiply(0.3)))
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.visuals_mut().override_text_color = Some(text_color);
            add_contents(ui);
        });
}

/// Blue box with a bold title and a plain body.
pub fn info(ui: &mut Ui, title: &str, body: &str) {
    callout(ui, INFO_FILL, INFO_TEXT, |ui: &mut Ui| {
        if !title.is_empty() {
            ui.label(RichText::new(title).strong());
        }
        ui.label(body);
    });
}

/// Yellow box for missing columns and empty selections.
pub fn warning(ui: &mut Ui, text: &str) {
    callout(ui, WARNING_FILL, WARNING_TEXT, |ui: &mut Ui| {
        ui.label(format!("⚠ {text}"));
    });
}

/// Large number with a small caption above it.
pub fn metric(ui: &mut Ui, caption: &str, value: &str) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(caption).small().weak());
        ui.label(RichText::new(value).size(30.0).strong());
    });
}

/// `12345` → `"12,345"`.
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format with `digits` significant digits the way printf `%g` does:
/// scientific notation for exponents below -4 or at least `digits`, trailing
/// zeros trimmed in both notations.
pub fn significant(v: f64, digits: usize) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{v}");
    }
    let digits = digits.max(1);
    // The exponent is taken after rounding, so 999.7 at 3 digits is 1e+03.
    let sci = format!("{:.*e}", digits - 1, v);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= digits as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exp.abs())
    } else {
        let decimals = (digits as i32 - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{v:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Combo box over `options`, keeping `selected` valid.
///
/// An empty or unknown selection snaps to the first option.
pub fn select_column(ui: &mut Ui, id: &str, label: &str, options: &[String], selected: &mut Option<String>) {
    if selected.as_ref().map_or(true, |s| !options.contains(s)) {
        *selected = options.first().cloned();
    }
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .width(ui.available_width().min(320.0))
            .selected_text(selected.clone().unwrap_or_default())
            .show_ui(ui, |ui: &mut Ui| {
                for opt in options {
                    ui.selectable_value(selected, Some(opt.clone()), opt.as_str());
                }
            });
    });
}

/// Combo box whose first entry is "None".
pub fn select_optional_column(
    ui: &mut Ui,
    id: &str,
    label: &str,
    options: &[String],
    selected: &mut Option<String>,
) {
    if selected.as_ref().is_some_and(|s| !options.contains(s)) {
        *selected = None;
    }
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .width(ui.available_width().min(320.0))
            .selected_text(selected.clone().unwrap_or_else(|| "None".to_string()))
            .show_ui(ui, |ui: &mut Ui| {
                ui.selectable_value(selected, None, "None");
                for opt in options {
                    ui.selectable_value(selected, Some(opt.clone()), opt.as_str());
                }
            });
    });
}

/// Row of selectable tab headers.
pub fn tab_bar<T: PartialEq + Copy>(ui: &mut Ui, current: &mut T, tabs: &[(T, &str)]) {
    ui.horizontal(|ui: &mut Ui| {
        for (tab, title) in tabs {
            ui.selectable_value(current, *tab, RichText::new(*title).size(15.0));
        }
    });
    ui.separator();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separator() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(9_813_456), "9,813,456");
    }

    #[test]
    fn significant_digits_like_printf_g() {
        assert_eq!(significant(0.1041, 3), "0.104");
        assert_eq!(significant(1.0, 3), "1");
        assert_eq!(significant(0.00012345, 3), "0.000123");
        assert_eq!(significant(1e-7, 3), "1e-07");
        assert_eq!(significant(4.008e-75, 3), "4.01e-75");
        assert_eq!(significant(999.7, 3), "1e+03");
        assert_eq!(significant(123456.0, 3), "1.23e+05");
        assert_eq!(significant(-0.000012, 2), "-1.2e-05");
        assert_eq!(significant(0.0, 3), "0");
        assert_eq!(significant(0.05, 3), "0.05");
    }
}
