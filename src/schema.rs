/// Column-name constants for pwt-growthkit schema.
/// Single source of truth for the input panel, derived features and report.

// ── Penn World Table panel columns ──────────────────────────────────────────
pub mod pwt {
    pub const COUNTRY_CODE: &str = "countrycode";
    pub const COUNTRY: &str = "country";
    pub const YEAR: &str = "year";
    pub const RGDPNA: &str = "rgdpna"; // real GDP, national accounts
    pub const RKNA: &str = "rkna"; // real capital stock
    pub const EMP: &str = "emp"; // persons engaged
    pub const AVH: &str = "avh"; // average annual hours per worker
    pub const LABSH: &str = "labsh"; // labor income share
    pub const RTFPNA: &str = "rtfpna"; // TFP index

    pub const REQUIRED: [&str; 9] = [
        COUNTRY_CODE,
        COUNTRY,
        YEAR,
        RGDPNA,
        RKNA,
        EMP,
        AVH,
        LABSH,
        RTFPNA,
    ];

    pub const NUMERIC: [&str; 6] = [RGDPNA, RKNA, EMP, AVH, LABSH, RTFPNA];
}

// ── Derived feature columns ─────────────────────────────────────────────────
pub mod derived {
    pub const Y: &str = "y"; // output per worker (or per hour)
    pub const K: &str = "k"; // capital per worker (or per hour)
    pub const ALPHA: &str = "alpha"; // 1 - labsh, per observation
}

// ── Report columns ──────────────────────────────────────────────────────────
pub mod report {
    pub const COUNTRY: &str = "Country";
    pub const START_YEAR: &str = "Start_Year";
    pub const END_YEAR: &str = "End_Year";
    pub const GROWTH_RATE: &str = "Growth_Rate";
    pub const TFP_GROWTH: &str = "TFP_Growth";
    pub const CAPITAL_DEEPENING: &str = "Capital_Deepening";
    pub const TFP_SHARE: &str = "TFP_Share";
    pub const CAPITAL_SHARE: &str = "Capital_Share";
    pub const TFP_INDEX_GROWTH: &str = "TFP_Index_Growth";

    pub const AVERAGE_LABEL: &str = "Average";
}
