//! Exploratory charts rendered with Plotters

use crate::record::{RawTable, Value};
use crate::schema::LABEL_DOMAIN;
use plotters::prelude::*;
use tracing::info;

/// Bar colors indexed by encoded label (No, Yes)
const LABEL_COLORS: [RGBColor; 2] = [BLUE, RED];

/// Count rows per label value, in `LABEL_DOMAIN` order. Other values are skipped.
pub fn label_counts(table: &RawTable, label: &str) -> [usize; 2] {
    let mut counts = [0usize; 2];
    for value in table.column(label).flatten() {
        let category = value.as_category();
        if let Some(i) = LABEL_DOMAIN.iter().position(|v| *v == category) {
            counts[i] += 1;
        }
    }
    counts
}

/// Numeric values of `column` grouped by label, in `LABEL_DOMAIN` order.
pub fn values_by_label(table: &RawTable, label: &str, column: &str) -> [Vec<f64>; 2] {
    let mut groups = [Vec::new(), Vec::new()];
    for row in table.rows() {
        let class = row
            .get(label)
            .map(Value::as_category)
            .and_then(|c| LABEL_DOMAIN.iter().position(|v| *v == c));
        let value = row.get(column).and_then(Value::as_number);
        if let (Some(class), Some(value)) = (class, value) {
            groups[class].push(value);
        }
    }
    groups
}

/// Bar chart of churned vs. retained customer counts.
pub fn create_churn_distribution_chart(
    table: &RawTable,
    label: &str,
    output_path: &str,
) -> crate::Result<()> {
    let counts = label_counts(table, label);
    let max_count = counts.iter().copied().max().unwrap_or(1).max(1) as u32;

    let root = BitMapBackend::new(output_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Distribution of Churned vs Not Churned Customers",
            ("sans-serif", 22),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (0u32..1u32).into_segmented(),
            0u32..(max_count + max_count / 10 + 1),
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(label)
        .y_desc("Count")
        .axis_desc_style(("sans-serif", 15))
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => LABEL_DOMAIN
                .get(*i as usize)
                .map(|s| s.to_string())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        })
        .draw()?;

    for (i, &count) in counts.iter().enumerate() {
        chart.draw_series(
            Histogram::vertical(&chart)
                .style(LABEL_COLORS[i].filled())
                .margin(40)
                .data(std::iter::once((i as u32, count as u32))),
        )?;
    }

    root.present()?;
    info!(path = output_path, "saved churn distribution chart");
    Ok(())
}

/// Box plot of a numeric attribute (monthly charges) split by churn label.
pub fn create_charges_boxplot(
    table: &RawTable,
    label: &str,
    column: &str,
    output_path: &str,
) -> crate::Result<()> {
    let groups = values_by_label(table, label, column);
    if groups.iter().any(Vec::is_empty) {
        anyhow::bail!("Cannot draw box plot: '{}' has no values for one of the labels", column);
    }

    let (lo, hi) = groups
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let pad = ((hi - lo) * 0.05).max(1.0);
    let labels: Vec<String> = LABEL_DOMAIN.iter().map(|s| s.to_string()).collect();

    let root = BitMapBackend::new(output_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let title = format!("{} vs {}", column, label);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            labels[..].into_segmented(),
            (lo - pad) as f32..(hi + pad) as f32,
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(label)
        .y_desc(column)
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(labels.iter().zip(groups.iter()).enumerate().map(
        |(i, (name, values))| {
            let quartiles = Quartiles::new(values);
            Boxplot::new_vertical(SegmentValue::CenterOf(name), &quartiles)
                .width(40)
                .whisker_width(0.5)
                .style(LABEL_COLORS[i])
        },
    ))?;

    root.present()?;
    info!(path = output_path, "saved box plot");
    Ok(())
}

/// Render both exploratory charts next to `base_output_path`.
pub fn generate_visualization_report(
    table: &RawTable,
    label: &str,
    base_output_path: &str,
) -> crate::Result<Vec<String>> {
    let distribution_path = base_output_path.to_string();
    create_churn_distribution_chart(table, label, &distribution_path)?;

    let boxplot_path = base_output_path.replace(".png", "_monthly_charges.png");
    create_charges_boxplot(table, label, "MonthlyCharges", &boxplot_path)?;

    Ok(vec![distribution_path, boxplot_path])
}
