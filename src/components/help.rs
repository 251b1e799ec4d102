use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Block, BorderType, Borders, Clear, Padding, Row, Table, Widget},
};

use crate::{
    action::ActionState,
    config::{key_event_to_string, PageKeyBindings},
};

#[derive(Debug)]
pub struct Help {
    keybinding_groups: Vec<(String, Vec<(String, String)>)>,
    column_spacing: u16,
    margin_vertical: u16,
    margin_horizontal: u16,
}

impl Help {
    pub fn new(keybinding_groups: Vec<(String, PageKeyBindings)>) -> Self {
        let groups = keybinding_groups
            .into_iter()
            .map(|(group_name, keybindings)| {
                let mut keybindings: Vec<(String, String)> = keybindings
                    .0
                    .into_iter()
                    .filter(|(_, action)| action.state == ActionState::Start)
                    .map(|(event, action)| (key_event_to_string(&event), action.command.string()))
                    .collect();
                keybindings.sort_by_key(|(key, _)| key.clone());
                (group_name, keybindings)
            })
            .collect();

        Self { keybinding_groups: groups, column_spacing: 5, margin_vertical: 1, margin_horizontal: 2 }
    }

    fn render_group(
        &self,
        area: Rect,
        buf: &mut Buffer,
        group_name: &String,
        keybindings: &Vec<(String, String)>,
        key_length: u16,
        val_length: u16,
    ) {
        let rows: Vec<Row> = keybindings.iter().map(|(key, val)| Row::new(vec![key.clone(), val.clone()])).collect();
        let widths = vec![Constraint::Length(key_length), Constraint::Min(val_length)];

        let table = Table::new(rows, widths)
            .column_spacing(self.column_spacing)
            .header(Row::new(vec!["Key", "Command"]).style(Style::new().bold()).bottom_margin(1))
            .block(
                Block::new()
                    .title(group_name.clone())
                    .title_alignment(Alignment::Center)
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::new().bold().fg(Color::Cyan))
                    .padding(Padding::symmetric(self.margin_horizontal, self.margin_vertical)),
            );

        Clear.render(area, buf);
        table.render(area, buf);
    }
}

impl Widget for Help {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let key_length = self
            .keybinding_groups
            .iter()
            .flat_map(|(_, keybindings)| keybindings.iter().map(|(key, _)| key.chars().count()))
            .max()
            .unwrap_or(0) as u16;
        let val_length = self
            .keybinding_groups
            .iter()
            .flat_map(|(_, keybindings)| keybindings.iter().map(|(_, val)| val.chars().count()))
            .max()
            .unwrap_or(0) as u16;

        let width = key_length + val_length + self.column_spacing + 2 * (self.margin_horizontal + 1);
        let [area] = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center).areas(area);

        // One bordered table per group, stacked in the middle of the canvas.
        let heights = self
            .keybinding_groups
            .iter()
            .map(|(_, keybindings)| Constraint::Length(keybindings.len() as u16 + 4 + 2 * self.margin_vertical))
            .collect::<Vec<_>>();
        let areas = Layout::vertical(heights).flex(Flex::Center).spacing(1).split(area);

        for (area, (group_name, keybindings)) in areas.iter().zip(self.keybinding_groups.iter()) {
            self.render_group(*area, buf, group_name, keybindings, key_length, val_length);
        }
    }
}
