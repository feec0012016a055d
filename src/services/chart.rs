//! Plotly Chart Renderer
//!
//! Turns a `ChartRequest` over a result table into a Plotly figure document
//! (`{data, layout}`) that the frontend hands straight to `Plotly.newPlot`.

use serde_json::{json, Value};

use query_pilot_core::table::cell_text;
use query_pilot_core::{ChartArtifact, ChartError, ChartKind, ChartRenderer, ChartRequest, Table};

/// Renders charts as Plotly figure JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlotlyChartRenderer;

impl PlotlyChartRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ChartRenderer for PlotlyChartRenderer {
    fn render(&self, request: &ChartRequest, table: &Table) -> Result<ChartArtifact, ChartError> {
        request.validate(table)?;

        let x = column(table, &request.x_field)?;
        let y_fields = request.used_y_fields();
        let color = request.options.color.as_str();

        let (data, y_title) = match request.kind {
            ChartKind::Bar | ChartKind::Line => {
                let trace_type = |trace: Value| -> Value {
                    let mut trace = trace;
                    if request.kind == ChartKind::Line {
                        trace["type"] = json!("scatter");
                        trace["mode"] = json!("lines");
                    } else {
                        trace["type"] = json!("bar");
                    }
                    trace
                };
                if y_fields.is_empty() {
                    (vec![trace_type(json!({"x": x, "marker": {"color": color}}))], None)
                } else {
                    let mut traces = Vec::with_capacity(y_fields.len());
                    for (i, field) in y_fields.iter().enumerate() {
                        let mut trace = json!({"x": x, "y": column(table, field)?, "name": field});
                        // Explicit color on the first series, palette for the rest
                        if i == 0 {
                            trace["marker"] = json!({"color": color});
                            trace["line"] = json!({"color": color});
                        }
                        traces.push(trace_type(trace));
                    }
                    let title = (y_fields.len() == 1).then(|| y_fields[0].clone());
                    (traces, title)
                }
            }
            ChartKind::Scatter | ChartKind::Box => {
                let mut trace = if request.kind == ChartKind::Scatter {
                    json!({"type": "scatter", "mode": "markers", "x": x, "marker": {"color": color}})
                } else {
                    json!({"type": "box", "x": x, "marker": {"color": color}})
                };
                let y_title = match y_fields.first() {
                    Some(field) => {
                        trace["y"] = json!(column(table, field)?);
                        Some(field.clone())
                    }
                    None => None,
                };
                (vec![trace], y_title)
            }
            ChartKind::Pie => {
                let mut trace = json!({"type": "pie", "labels": x});
                if let Some(field) = y_fields.first() {
                    trace["values"] = json!(column(table, field)?);
                }
                (vec![trace], None)
            }
            ChartKind::Histogram => (
                vec![json!({"type": "histogram", "x": x, "marker": {"color": color}})],
                Some("count".to_string()),
            ),
            ChartKind::Heatmap => {
                let trace = heatmap_trace(table, request)?;
                (vec![trace], request.y_fields.first().cloned())
            }
        };

        let title = request.title();
        let mut layout = json!({
            "title": {"text": title},
            "height": request.height(),
            "template": "plotly_white",
        });
        if request.kind != ChartKind::Pie {
            layout["xaxis"] = json!({"title": {"text": request.x_field}});
            if let Some(y_title) = y_title {
                layout["yaxis"] = json!({"title": {"text": y_title}});
            }
        }

        tracing::debug!(kind = ?request.kind, traces = data.len(), "Rendered chart");
        Ok(ChartArtifact {
            kind: request.kind,
            title,
            figure: json!({"data": data, "layout": layout}),
        })
    }
}

fn column(table: &Table, name: &str) -> Result<Vec<Value>, ChartError> {
    let index = table
        .column_index(name)
        .ok_or_else(|| ChartError::UnknownColumn(name.to_string()))?;
    Ok(table.column_values(index).cloned().collect())
}

/// Mean of the value column for every (y, x) cell; empty cells are null.
fn heatmap_trace(table: &Table, request: &ChartRequest) -> Result<Value, ChartError> {
    let (y_field, value_field) = match request.y_fields.as_slice() {
        [y, value, ..] => (y, value),
        [_] => return Err(ChartError::MissingField("value".to_string())),
        [] => return Err(ChartError::MissingField("y axis".to_string())),
    };

    let x_values = column(table, &request.x_field)?;
    let y_values = column(table, y_field)?;
    let values = column(table, value_field)?;

    let mut x_categories: Vec<String> = Vec::new();
    let mut y_categories: Vec<String> = Vec::new();
    // (y index, x index) -> (sum, count)
    let mut cells: Vec<Vec<(f64, u32)>> = Vec::new();

    for ((x, y), value) in x_values.iter().zip(&y_values).zip(&values) {
        let number = match value {
            Value::Null => continue,
            other => other
                .as_f64()
                .ok_or_else(|| ChartError::NonNumeric(value_field.clone()))?,
        };

        let xi = position_or_insert(&mut x_categories, cell_text(x));
        let yi = position_or_insert(&mut y_categories, cell_text(y));
        for row in cells.iter_mut() {
            row.resize(x_categories.len(), (0.0, 0));
        }
        while cells.len() < y_categories.len() {
            cells.push(vec![(0.0, 0); x_categories.len()]);
        }

        let cell = &mut cells[yi][xi];
        cell.0 += number;
        cell.1 += 1;
    }

    let z: Vec<Vec<Value>> = cells
        .iter()
        .map(|row| {
            row.iter()
                .map(|(sum, count)| {
                    if *count == 0 {
                        Value::Null
                    } else {
                        json!(sum / f64::from(*count))
                    }
                })
                .collect()
        })
        .collect();

    Ok(json!({
        "type": "heatmap",
        "x": x_categories,
        "y": y_categories,
        "z": z,
        "colorscale": "Blues",
        "colorbar": {"title": {"text": value_field}},
    }))
}

fn position_or_insert(categories: &mut Vec<String>, label: String) -> usize {
    match categories.iter().position(|c| *c == label) {
        Some(i) => i,
        None => {
            categories.push(label);
            categories.len() - 1
        }
    }
}
