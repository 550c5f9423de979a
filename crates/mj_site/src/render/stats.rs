use mj_core::RubricType;
use std::fmt::Write;

use crate::crud::RubricStatistics;
use crate::format::escape;

/// Admin panel block with per-type counts, their share of the total and a
/// bar for each.
pub fn render_rubric_statistics(stats: &RubricStatistics) -> String {
    let mut html = format!(
        "<div class=\"rubric-stats-panel\"><div class=\"rubric-stats-total\">\
         <span class=\"stats-number\">{}</span><span class=\"stats-label\">общо публикации</span></div>",
        stats.total
    );
    for rubric_type in RubricType::ALL {
        let info = rubric_type.info();
        let percentage = stats.percentage(rubric_type);
        let _ = write!(
            html,
            "<div class=\"rubric-stats-row {}\">\
             <span class=\"stats-name\">{}</span>\
             <span class=\"stats-count\">{}</span>\
             <div class=\"stats-bar\"><div class=\"stats-bar-fill\" style=\"width: {}%; background: {};\"></div></div>\
             <span class=\"stats-percentage\">{}%</span></div>",
            rubric_type.id(),
            escape(info.name),
            stats.count(rubric_type),
            percentage,
            info.color,
            percentage
        );
    }
    let _ = write!(
        html,
        "<div class=\"rubric-stats-recent\">Последните 7 дни: {}</div></div>",
        stats.last_week
    );
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_statistics_panel() {
        let stats = RubricStatistics {
            total: 3,
            by_type: BTreeMap::from([(RubricType::Recipes, 2), (RubricType::Jokes, 1)]),
            last_week: 1,
        };
        let html = render_rubric_statistics(&stats);
        assert!(html.contains("<span class=\"stats-number\">3</span>"));
        assert!(html.contains("width: 67%"));
        assert!(html.contains("width: 33%"));
        assert!(html.contains("width: 0%"));
        assert!(html.contains("Последните 7 дни: 1"));
    }

    #[test]
    fn test_empty_statistics_have_zero_shares() {
        let html = render_rubric_statistics(&RubricStatistics::default());
        assert_eq!(html.matches("width: 0%").count(), 3);
    }
}
