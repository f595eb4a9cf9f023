//! Plausible example data for any template, chosen from the template name

use crate::model::{InfographicData, Item};

/// Example payload for a template.
///
/// The shape follows the template family as read from the name: SWOT grids get
/// four groups, comparisons two groups, hierarchies a single rooted tree, charts
/// flat valued items. Anything else gets four sequential steps. Total over any
/// input.
pub fn default_data(template: &str) -> InfographicData {
    let is_compare = template.starts_with("compare-");
    let is_chart = template.contains("chart-");

    if template.contains("compare-") && template.contains("swot") {
        return swot();
    }
    if is_compare {
        return comparison();
    }
    if template.starts_with("hierarchy-") {
        return organization();
    }
    if is_chart && template.contains("pie") {
        return distribution();
    }
    if is_chart {
        return monthly();
    }
    steps(template)
}

fn group(label: &str, children: &[&str]) -> Item {
    Item::branch(label, children.iter().map(|c| Item::leaf(*c)).collect())
}

fn valued(label: &str, value: f64) -> Item {
    // values below are finite constants
    Item::leaf(label).with_value(value).unwrap_or_else(|_| Item::leaf(label))
}

fn swot() -> InfographicData {
    InfographicData::new(
        "SWOT 分析",
        vec![
            group("Strengths", &["优势点1", "优势点2"]),
            group("Weaknesses", &["劣势点1", "劣势点2"]),
            group("Opportunities", &["机会点1", "机会点2"]),
            group("Threats", &["威胁点1", "威胁点2"]),
        ],
    )
}

fn comparison() -> InfographicData {
    let features = || {
        vec![
            Item::leaf("特点1").with_desc("描述1"),
            Item::leaf("特点2").with_desc("描述2"),
        ]
    };
    InfographicData::new(
        "对比分析",
        vec![
            Item::branch("方案A", features()),
            Item::branch("方案B", features()),
        ],
    )
}

fn organization() -> InfographicData {
    InfographicData::new(
        "组织架构",
        vec![Item::branch(
            "总部",
            vec![
                group("部门A", &["团队1", "团队2"]),
                group("部门B", &["团队3", "团队4"]),
            ],
        )],
    )
}

fn distribution() -> InfographicData {
    InfographicData::new(
        "数据分布",
        vec![
            valued("类别A", 35.0),
            valued("类别B", 28.0),
            valued("类别C", 22.0),
            valued("其他", 15.0),
        ],
    )
}

fn monthly() -> InfographicData {
    InfographicData::new(
        "数据统计",
        vec![
            valued("1月", 120.0),
            valued("2月", 150.0),
            valued("3月", 180.0),
            valued("4月", 200.0),
            valued("5月", 220.0),
        ],
    )
}

fn steps(template: &str) -> InfographicData {
    let title = template.split('-').take(2).collect::<Vec<_>>().join(" ");
    let items = [
        ("步骤一", "第一步描述"),
        ("步骤二", "第二步描述"),
        ("步骤三", "第三步描述"),
        ("步骤四", "第四步描述"),
    ]
    .iter()
    .zip(1u8..)
    .map(|(&(label, desc), n)| valued(label, f64::from(n)).with_desc(desc))
    .collect();
    InfographicData::new(title, items)
}
