use eframe::egui::{Color32, CornerRadius, Frame, Margin, RichText, Shadow, Ui};

const CARD_FILL: Color32 = Color32::from_rgb(240, 242, 246);
const CARD_HEADING: Color32 = Color32::from_rgb(13, 59, 102);
const CARD_MIN_HEIGHT: f32 = 220.0;

const INTRO: &str = "ReproSight is a clinical analytics platform designed to reveal the hidden \
relationships between environmental toxin exposure and human reproductive health. This dashboard \
brings data scientists and clinicians together to explore patterns, test hypotheses, and \
translate data into actionable insights.";

/// The four source tables merged into the survey dataset.
const DATASET_CARDS: [(&str, &str); 4] = [
    (
        "Reproductive Hormone Dataset",
        "Contains serum levels of testosterone, estradiol, and SHBG along with detection limit \
         flags for hormonal assessment.",
    ),
    (
        "Environmental Metal Exposure Dataset",
        "Includes blood concentrations of heavy metals such as lead, cadmium, mercury, selenium, \
         and manganese.",
    ),
    (
        "Reproductive Health Questionnaire",
        "Captures reproductive history including menstrual patterns, pregnancy attempts, \
         menopause, hysterectomy, and hormone therapy.",
    ),
    (
        "Demographic and Socioeconomic Dataset",
        "Provides demographic variables like age, gender, ethnicity, education, and income for \
         contextual modeling.",
    ),
];

fn card(ui: &mut Ui, title: &str, body: &str, min_height: f32) {
    Frame::new()
        .fill(CARD_FILL)
        .corner_radius(CornerRadius::same(10))
        .inner_margin(Margin::same(24))
        .shadow(Shadow {
            offset: [0, 4],
            blur: 8,
            spread: 0,
            color: Color32::from_black_alpha(50),
        })
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.set_min_height(min_height);
            ui.label(RichText::new(title).size(17.0).strong().color(CARD_HEADING));
            ui.add_space(8.0);
            ui.label(RichText::new(body).color(Color32::from_gray(40)));
        });
}

pub fn show(ui: &mut Ui) {
    ui.label(RichText::new("Welcome to ReproSight Analytics Hub!").size(30.0).strong());
    ui.add_space(10.0);

    card(ui, "What is ReproSight?", INTRO, 0.0);

    ui.add_space(10.0);
    ui.separator();

    ui.label(RichText::new("📊 Datasets powering ReproSight").size(22.0).strong());
    ui.add_space(6.0);

    ui.columns(DATASET_CARDS.len(), |cols: &mut [Ui]| {
        for (col, (title, body)) in cols.iter_mut().zip(DATASET_CARDS) {
            card(col, title, body, CARD_MIN_HEIGHT);
        }
    });

    ui.add_space(10.0);
    ui.separator();
    ui.label(
        RichText::new(
            "Choose 'Key Insights' in the sidebar for the headline findings, or 'Explore Dataset' \
             for the full interactive toolkit.",
        )
        .italics(),
    );
}
