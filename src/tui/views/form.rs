// Create/edit form and read-only detail overlays
//
// Both are drawn as centered modals on top of a list screen. The form edits
// one field at a time through a `TextInput` that mirrors the focused value of
// the underlying `FormState`.

use crate::form::{FieldSpec, FormState};
use crate::i18n::Labels;
use crate::table::{format, CellText, Column, TableRow, Viewport};
use crate::tui::input::{InputOutcome, TextInput};
use crate::tui::layout::centered_percent;
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

/// What the form wants its owner to do after a key
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    Continue,
    Cancel,
    /// Validated request body
    Submit(Value),
    /// Submission blocked by validation errors
    Invalid,
}

pub struct FormView {
    form: FormState,
    focus: usize,
    input: TextInput,
    /// `Some` when editing an existing entity
    editing_id: Option<String>,
    submitting: bool,
}

impl FormView {
    pub fn create(fields: Vec<FieldSpec>, labels: &'static Labels) -> Self {
        let form = FormState::new(fields, labels);
        Self {
            input: TextInput::new(form.value_at(0)),
            form,
            focus: 0,
            editing_id: None,
            submitting: false,
        }
    }

    pub fn edit(
        fields: Vec<FieldSpec>,
        labels: &'static Labels,
        id: impl Into<String>,
        entity: &Value,
    ) -> Self {
        let mut view = Self::create(fields, labels);
        view.form.prefill(entity);
        view.input = TextInput::new(view.form.value_at(0));
        view.editing_id = Some(id.into());
        view
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn focus_field(&mut self, index: usize) {
        let count = self.form.fields().len();
        if count == 0 {
            return;
        }
        self.focus = index % count;
        self.input = TextInput::new(self.form.value_at(self.focus));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        if self.submitting {
            return FormOutcome::Continue;
        }
        let count = self.form.fields().len();
        match key.code {
            KeyCode::Esc => FormOutcome::Cancel,
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => self.submit(),
            KeyCode::Enter if self.focus + 1 >= count => self.submit(),
            KeyCode::Enter | KeyCode::Tab | KeyCode::Down => {
                self.focus_field(self.focus + 1);
                FormOutcome::Continue
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_field(self.focus + count.saturating_sub(1));
                FormOutcome::Continue
            }
            _ => {
                if self.input.handle_key(key) == InputOutcome::Changed {
                    if let Some(value) = self.form.value_at_mut(self.focus) {
                        *value = self.input.value().to_string();
                    }
                }
                FormOutcome::Continue
            }
        }
    }

    fn submit(&mut self) -> FormOutcome {
        match self.form.to_json() {
            Some(body) => FormOutcome::Submit(body),
            None => FormOutcome::Invalid,
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, title: &str, theme: &Theme) {
        let height = (self.form.fields().len() as u16) * 3 + 4;
        let modal = centered_percent(60, 0, (50, height), area);
        let label_width = self
            .form
            .fields()
            .iter()
            .map(|s| s.label.width() + 2)
            .max()
            .unwrap_or(0);

        let mut lines = Vec::new();
        for (i, spec) in self.form.fields().iter().enumerate() {
            let focused = i == self.focus;
            let marker = if spec.is_required() { "*" } else { " " };
            let label = format!("{:>width$}{} ", spec.label, marker, width = label_width - 1);
            let value = if focused {
                self.input.display()
            } else {
                self.form.value_at(i).to_string()
            };
            let label_style = if focused {
                Style::default().fg(theme.border_focused).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.muted)
            };
            lines.push(Line::from(vec![
                Span::styled(label, label_style),
                Span::styled(value, Style::default().fg(theme.text)),
            ]));
            let error = self.form.error(spec.name).unwrap_or("");
            lines.push(Line::from(Span::styled(
                format!("{}{}", " ".repeat(label_width + 1), error),
                Style::default().fg(theme.danger),
            )));
        }
        lines.push(Line::from(Span::styled(
            if self.submitting {
                " … "
            } else {
                " Enter next · Ctrl+S save · Esc cancel "
            },
            Style::default().fg(theme.muted),
        )));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border_focused))
            .title(Span::styled(
                format!(" {} ", title),
                Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
            ));

        f.render_widget(Clear, modal);
        f.render_widget(Paragraph::new(lines).block(block), modal);
    }
}

/// Read-only field list of one entity, every column at desktop width
pub struct DetailView {
    pub id: String,
    fields: Vec<(String, CellText)>,
}

impl DetailView {
    pub fn new<R: TableRow>(row: &R, columns: &[Column<R>], locale: crate::i18n::Locale) -> Self {
        let json = serde_json::to_value(row).unwrap_or(Value::Null);
        let fields = columns
            .iter()
            .map(|column| {
                let value = crate::table::resolve_path(&json, &column.id);
                let cell = match &column.render {
                    Some(render) => render(value, row),
                    None => format::format_value(column.format, value, Viewport::Desktop, locale),
                };
                (column.label.clone(), cell)
            })
            .collect();
        Self {
            id: row.row_id(),
            fields,
        }
    }

    pub fn fields(&self) -> &[(String, CellText)] {
        &self.fields
    }

    pub fn render(&self, f: &mut Frame, area: Rect, title: &str, theme: &Theme) {
        let height = self.fields.len() as u16 + 4;
        let modal = centered_percent(60, 0, (50, height), area);
        let label_width = self.fields.iter().map(|(l, _)| l.width()).max().unwrap_or(0);

        let mut lines: Vec<Line> = self
            .fields
            .iter()
            .map(|(label, cell)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:>width$}  ", label, width = label_width),
                        Style::default().fg(theme.muted),
                    ),
                    Span::styled(cell.text.clone(), Style::default().fg(theme.tone(cell.tone))),
                ])
            })
            .collect();
        lines.push(Line::from(Span::styled(
            " Esc close · y copy ",
            Style::default().fg(theme.muted),
        )));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border_focused))
            .title(Span::styled(
                format!(" {} · {} ", title, self.id),
                Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
            ));

        f.render_widget(Clear, modal);
        f.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            modal,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Rule;
    use crate::i18n::Locale;
    use crate::table::Format;
    use serde_json::json;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(view: &mut FormView, text: &str) {
        for ch in text.chars() {
            view.handle_key(key(KeyCode::Char(ch)));
        }
    }

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("name", "Name").rule(Rule::Required),
            FieldSpec::number("sellingPrice", "Price").rule(Rule::Numeric),
        ]
    }

    #[test]
    fn typing_flows_into_form_state() {
        let mut view = FormView::create(fields(), Locale::En.labels());
        type_text(&mut view, "Sữa tươi");
        view.handle_key(key(KeyCode::Tab));
        type_text(&mut view, "32000");

        assert_eq!(view.form().value("name"), Some("Sữa tươi"));
        assert_eq!(
            view.handle_key(key(KeyCode::Enter)),
            FormOutcome::Submit(json!({"name": "Sữa tươi", "sellingPrice": 32000}))
        );
    }

    #[test]
    fn invalid_form_blocks_submit() {
        let mut view = FormView::create(fields(), Locale::En.labels());
        view.handle_key(key(KeyCode::Tab));
        type_text(&mut view, "abc");

        assert_eq!(view.handle_key(key(KeyCode::Enter)), FormOutcome::Invalid);
        assert!(view.form().error("name").is_some());
        assert!(view.form().error("sellingPrice").is_some());
    }

    #[test]
    fn edit_prefills_and_tracks_id() {
        let entity = json!({"id": "p-1", "name": "Trà xanh", "sellingPrice": 15000});
        let mut view = FormView::edit(fields(), Locale::En.labels(), "p-1", &entity);
        assert_eq!(view.editing_id(), Some("p-1"));

        view.handle_key(key(KeyCode::Backspace));
        assert_eq!(view.form().value("name"), Some("Trà xan"));
        assert_eq!(view.form().value("sellingPrice"), Some("15000"));
    }

    #[test]
    fn escape_cancels() {
        let mut view = FormView::create(fields(), Locale::En.labels());
        assert_eq!(view.handle_key(key(KeyCode::Esc)), FormOutcome::Cancel);
    }

    #[test]
    fn detail_lists_every_column() {
        let columns = vec![
            Column::new("name", "Name"),
            Column::new("sellingPrice", "Price").format(Format::Price),
        ];
        let row = json!({"id": "p-9", "name": "Cà phê", "sellingPrice": 1234567});
        let detail = DetailView::new(&row, &columns, Locale::Vi);

        assert_eq!(detail.id, "p-9");
        let texts: Vec<&str> = detail.fields().iter().map(|(_, c)| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Cà phê", "1.234.567 VND"]);
    }
}
