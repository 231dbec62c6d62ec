/// Vendor segment of generated media types, e.g. the `vnd.ibexa.api` in
/// `application/vnd.ibexa.api.Section+json`.
pub const DEFAULT_VENDOR: &str = "vnd.ibexa.api";

/// Rendering knobs shared by both output backends.
///
/// A settings value is built once (configuration time) and borrowed by each
/// request-scoped generator, which copies out what it needs.
#[derive(Debug, Clone)]
pub struct OutputSettings {
    vendor: String,
    pretty: bool,
    strict: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            vendor: DEFAULT_VENDOR.to_owned(),
            pretty: false,
            strict: false,
        }
    }
}

impl OutputSettings {
    pub fn new() -> Self {
        Default::default()
    }

    /// Overrides the vendor segment of generated media types.
    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    /// Pretty-prints the serialized document (indentation and newlines).
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// In strict mode a normalization failure aborts the document build
    /// instead of degrading the offending value to `null`.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn vendor_name(&self) -> &str {
        &self.vendor
    }

    pub fn should_pretty_print(&self) -> bool {
        self.pretty
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}
