use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::data::model::{Dataset, MissingBands};
use crate::stats::correlation::{CorrelationMatrix, THRESHOLD_DECIMALS};
use crate::stats::summary::{ColumnSummary, describe_numeric};

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Sidebar selection: who is looking at the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Landing page
    #[default]
    Landing,
    /// Data-scientist sandbox
    ExploreDataset,
    /// Stakeholder narrative
    KeyInsights,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Landing, Mode::ExploreDataset, Mode::KeyInsights];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Landing => "Select mode ...",
            Mode::ExploreDataset => "Explore Dataset",
            Mode::KeyInsights => "Key Insights",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsightsTab {
    #[default]
    Hormones,
    Fertility,
    Menstrual,
    Menopause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExplorerTab {
    #[default]
    Overview,
    Univariate,
    Bivariate,
    Correlation,
}

// ---------------------------------------------------------------------------
// Per-view widget selections
// ---------------------------------------------------------------------------

/// Selections of the stakeholder view. Every selector keeps its own value.
#[derive(Debug, Clone, Default)]
pub struct InsightsState {
    pub tab: InsightsTab,
    pub scatter_metal: Option<String>,
    pub scatter_hormone: Option<String>,
    pub fertility_metal: Option<String>,
    pub menstrual_metal: Option<String>,
    pub menarche_metal: Option<String>,
    pub menopause_metal: Option<String>,
}

/// Selections of the data-scientist view.
#[derive(Debug, Clone)]
pub struct ExplorerState {
    pub tab: ExplorerTab,
    pub univariate_column: Option<String>,
    pub bivariate_x: Option<String>,
    pub bivariate_y: Option<String>,
    pub bivariate_color: Option<String>,
    /// Absolute correlation below which matrix cells are blanked.
    pub corr_threshold: f64,
}

pub const DEFAULT_CORR_THRESHOLD: f64 = 0.3;

impl Default for ExplorerState {
    fn default() -> Self {
        Self {
            tab: ExplorerTab::default(),
            univariate_column: None,
            bivariate_x: None,
            bivariate_y: None,
            bivariate_color: None,
            corr_threshold: DEFAULT_CORR_THRESHOLD,
        }
    }
}

// ---------------------------------------------------------------------------
// Derived data (computed once per dataset)
// ---------------------------------------------------------------------------

/// Expensive whole-table results, computed lazily and dropped on reload.
#[derive(Debug, Clone, Default)]
pub struct DerivedCache {
    numeric_correlation: Option<CorrelationMatrix>,
    summaries: Option<Vec<ColumnSummary>>,
    missing_bands: Option<MissingBands>,
}

/// Row bands in the missing-values heatmap.
pub const MAX_MISSING_BANDS: usize = 100;

impl DerivedCache {
    /// Rounded (2 decimals) correlation matrix over every numeric column.
    pub fn numeric_correlation(&mut self, dataset: &Dataset) -> &CorrelationMatrix {
        self.numeric_correlation.get_or_insert_with(|| {
            log::debug!("computing correlation matrix over {} numeric columns", dataset.numeric_column_names().len());
            CorrelationMatrix::numeric(dataset).rounded(THRESHOLD_DECIMALS)
        })
    }

    pub fn summaries(&mut self, dataset: &Dataset) -> &[ColumnSummary] {
        self.summaries
            .get_or_insert_with(|| describe_numeric(dataset.columns()))
    }

    pub fn missing_bands(&mut self, dataset: &Dataset) -> &MissingBands {
        self.missing_bands
            .get_or_insert_with(|| dataset.missing_bands(MAX_MISSING_BANDS))
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file loads).
    pub dataset: Option<Dataset>,

    /// Where the dataset came from.
    pub source: Option<PathBuf>,

    pub mode: Mode,
    pub insights: InsightsState,
    pub explorer: ExplorerState,
    pub derived: DerivedCache,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Ingest a newly loaded dataset and reset every selection to its default.
    pub fn set_dataset(&mut self, dataset: Dataset, source: &Path) {
        self.insights = InsightsState {
            tab: self.insights.tab,
            ..InsightsState::default()
        };
        self.explorer = ExplorerState {
            tab: self.explorer.tab,
            ..ExplorerState::default()
        };
        self.derived = DerivedCache::default();
        self.dataset = Some(dataset);
        self.source = Some(source.to_path_buf());
        self.status_message = None;
    }

    /// Load `path`, keeping the current dataset if loading fails.
    pub fn load(&mut self, path: &Path) {
        match crate::data::loader::load_file(path) {
            Ok(dataset) => self.set_dataset(dataset, path),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::model::{CellValue, Column};

    fn tiny() -> Dataset {
        let col = |name: &str, v: &[f64]| {
            Column::new(name, v.iter().map(|&x| CellValue::Float(x)).collect())
        };
        Dataset::from_columns(vec![
            col("a", &[1.0, 2.0, 3.0]),
            col("b", &[3.0, 1.0, 2.0]),
        ])
        .unwrap()
    }

    #[test]
    fn new_dataset_resets_selections_but_keeps_tabs() {
        let mut state = AppState::new(Mode::ExploreDataset);
        state.explorer.tab = ExplorerTab::Correlation;
        state.explorer.corr_threshold = 0.9;
        state.explorer.bivariate_x = Some("gone".into());
        state.insights.fertility_metal = Some("cadmium_µg/L".into());
        state.status_message = Some("Error: old".into());

        state.set_dataset(tiny(), Path::new("tiny.csv"));

        assert_eq!(state.mode, Mode::ExploreDataset);
        assert_eq!(state.explorer.tab, ExplorerTab::Correlation);
        assert_eq!(state.explorer.corr_threshold, DEFAULT_CORR_THRESHOLD);
        assert_eq!(state.explorer.bivariate_x, None);
        assert_eq!(state.insights.fertility_metal, None);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut state = AppState::default();
        state.set_dataset(tiny(), Path::new("tiny.csv"));
        state.load(Path::new("/definitely/not/here.csv"));
        assert!(state.dataset.is_some());
        assert!(state.status_message.as_deref().unwrap().starts_with("Error:"));
    }

    #[test]
    fn load_replaces_dataset_and_clears_cache() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "x,y\n1,2\n2,4\n3,5").unwrap();

        let mut state = AppState::default();
        state.set_dataset(tiny(), Path::new("tiny.csv"));
        let ds = state.dataset.as_ref().unwrap();
        assert_eq!(state.derived.numeric_correlation(ds).rows, vec!["a", "b"]);

        state.load(file.path());
        let ds = state.dataset.as_ref().unwrap();
        assert_eq!(ds.column_names(), vec!["x", "y"]);
        assert_eq!(state.derived.numeric_correlation(ds).rows, vec!["x", "y"]);
        assert_eq!(state.derived.summaries(ds).len(), 2);
        assert_eq!(state.derived.missing_bands(ds).labels, vec!["0", "1", "2"]);
    }

    #[test]
    fn mode_labels_match_sidebar() {
        let labels: Vec<_> = Mode::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(labels, ["Select mode ...", "Explore Dataset", "Key Insights"]);
    }
}
