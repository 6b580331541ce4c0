mod scan;

pub use scan::ScanService;
