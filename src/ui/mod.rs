pub mod charts;
pub mod explorer;
pub mod insights;
pub mod landing;
pub mod panels;
pub mod widgets;
