use crate::domain::label::{counter_for, LabelField, LabelRecord};

const CARD_WIDTH: usize = 44;

pub fn render_cards(records: &[LabelRecord]) -> Vec<String> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let counter = counter_for(record, index, records.len());
            let border = format!("+{}+", "-".repeat(CARD_WIDTH + 2));
            let mut lines = vec![border.clone()];
            for field in LabelField::all().filter(|field| *field != LabelField::Parts) {
                lines.push(card_line(&format!(
                    "{:<12}{}",
                    field.display_name(),
                    record.get(field)
                )));
            }
            let counter = counter.to_string();
            lines.push(card_line(&format!("{counter:>width$}", width = CARD_WIDTH)));
            lines.push(border);
            lines.join("\n")
        })
        .collect()
}

// Long values run past the border; cards do not wrap.
fn card_line(text: &str) -> String {
    format!("| {text:<width$} |", width = CARD_WIDTH)
}
