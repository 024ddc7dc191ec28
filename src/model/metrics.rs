/// Quality dimension scored per report row, in chart order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Protection,
    Refactoring,
    Feedback,
    Maintenance,
}

pub const METRIC_COUNT: usize = 4;

pub fn metric_order() -> &'static [Metric; METRIC_COUNT] {
    &[
        Metric::Protection,
        Metric::Refactoring,
        Metric::Feedback,
        Metric::Maintenance,
    ]
}

impl Metric {
    pub fn index(self) -> usize {
        match self {
            Metric::Protection => 0,
            Metric::Refactoring => 1,
            Metric::Feedback => 2,
            Metric::Maintenance => 3,
        }
    }

    /// CSV header name.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Protection => "Protection",
            Metric::Refactoring => "Refactoring",
            Metric::Feedback => "Feedback",
            Metric::Maintenance => "Maintenance",
        }
    }

    /// Legend label shown on the chart.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Protection => "Защита от багов",
            Metric::Refactoring => "Устойчивость к рефакторингу",
            Metric::Feedback => "Скорость обратной связи",
            Metric::Maintenance => "Простота поддержки",
        }
    }

    /// Bar and legend fill.
    pub fn color_rgb(self) -> (u8, u8, u8) {
        match self {
            Metric::Protection => (0x2e, 0xcc, 0x71),
            Metric::Refactoring => (0x34, 0x98, 0xdb),
            Metric::Feedback => (0xe7, 0x4c, 0x3c),
            Metric::Maintenance => (0xf1, 0xc4, 0x0f),
        }
    }

    /// Bar offset from the cluster tick, in bar widths. The cluster is not
    /// centered on its tick: it spans one width left to two widths right.
    pub fn offset_factor(self) -> f64 {
        match self {
            Metric::Protection => -1.0,
            Metric::Refactoring => 0.0,
            Metric::Feedback => 1.0,
            Metric::Maintenance => 2.0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/metrics.rs"]
mod tests;
