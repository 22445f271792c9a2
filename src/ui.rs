use num_format::{Locale, ToFormattedString};
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Span, Spans},
    widgets::{
        Axis, BarChart, Block, Borders, Cell, Chart, Dataset, Gauge, GraphType, List, ListItem,
        ListState, Paragraph, Row, Table, TableState, Tabs, Wrap,
    },
    Frame,
};

use crate::app::{App, MenuItem};
use crate::dataset::Field;
use crate::report::{self, Share};

const PRIMARY: Color = Color::Rgb(0x00, 0x17, 0xC1);
const SECONDARY: Color = Color::Rgb(0x49, 0x79, 0xF5);
const TERTIARY: Color = Color::Rgb(0x9D, 0xB7, 0xF9);
const PALE: Color = Color::Rgb(0xD9, 0xE6, 0xFF);

/// Two-tone palette of the proportion charts, with the matching text colors.
const MIX_COLORS: [(Color, Color); 2] = [(PRIMARY, Color::White), (PALE, Color::Black)];

/// Line colors, oldest year first.
const TREND_COLORS: [Color; 3] = [TERTIARY, SECONDARY, PRIMARY];

const MENU_TITLES: [&'static str; 4] = ["Dashboard", "Table", "Help", "Quit"];

const TABLE_HEADERS: [&'static str; 7] = ["日時", "年齢", "性別", "商品", "年代", "年", "月"];
const TABLE_WIDTHS: [Constraint; 7] = [
    Constraint::Length(20),
    Constraint::Length(5),
    Constraint::Length(6),
    Constraint::Min(10),
    Constraint::Length(6),
    Constraint::Length(7),
    Constraint::Length(5),
];

pub fn draw<B: Backend>(rect: &mut Frame<B>, app: &App) {
    let size = rect.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(size);

    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)].as_ref())
        .split(chunks[0]);
    rect.render_widget(menu(app.active_menu_item), header_chunks[0]);
    rect.render_widget(load_status(app), header_chunks[1]);

    match app.active_menu_item {
        MenuItem::Dashboard => draw_dashboard(rect, app, chunks[1]),
        MenuItem::Table => draw_table(rect, app, chunks[1]),
        MenuItem::Help => rect.render_widget(help(), chunks[1]),
    }
}

fn menu<'a>(active: MenuItem) -> Tabs<'a> {
    let menu = MENU_TITLES
        .iter()
        .map(|t| {
            let (first, rest) = t.split_at(1);
            Spans::from(vec![
                Span::styled(
                    first,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::UNDERLINED),
                ),
                Span::styled(rest, Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    Tabs::new(menu)
        .select(active.into())
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Cyan))
        .highlight_style(Style::default().fg(Color::Yellow))
        .divider(Span::raw("|"))
}

fn load_status<'a>(app: &App) -> Paragraph<'a> {
    let load = app.dashboard().load;
    let text = format!(
        "読込 {} 件  スキップ {} 件 (年齢 {} / 日時 {})",
        load.loaded.to_formatted_string(&Locale::en),
        load.skipped(),
        load.skipped_age,
        load.skipped_timestamp
    );
    let style = if load.skipped() > 0 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Green)
    };
    Paragraph::new(Spans::from(Span::styled(text, style)))
        .block(Block::default().title("Data").borders(Borders::ALL))
        .alignment(Alignment::Center)
}

fn help<'a>() -> Paragraph<'a> {
    let lines = vec![
        ("Tab / BackTab", "フィルタの切り替え"),
        ("Up / Down", "項目の移動"),
        ("Space / Enter", "選択・解除"),
        ("a", "すべて選択"),
        ("n", "すべて解除"),
        ("r", "全フィルタをリセット"),
        ("Up / Down (Table)", "行の移動"),
        ("d / t / h", "ダッシュボード / データ / ヘルプ"),
        ("q / Esc", "終了"),
    ]
    .into_iter()
    .map(|(key, action)| {
        Spans::from(vec![
            Span::styled(
                format!("{:<20}", key),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(action),
        ])
    })
    .collect::<Vec<_>>();
    Paragraph::new(lines)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .wrap(Wrap { trim: true })
}

fn draw_dashboard<B: Backend>(rect: &mut Frame<B>, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(22), Constraint::Percentage(78)].as_ref())
        .split(area);
    draw_filters(rect, app, columns[0]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(6),
                Constraint::Percentage(45),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(columns[1]);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(34), Constraint::Percentage(66)].as_ref())
        .split(rows[0]);
    rect.render_widget(card(app), top[0]);
    rect.render_widget(badges(app), top[1]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(33),
                Constraint::Percentage(33),
                Constraint::Percentage(34),
            ]
            .as_ref(),
        )
        .split(rows[1]);
    let dashboard = app.dashboard();
    draw_mix(rect, report::SEX_MIX_TITLE, &dashboard.sex_mix, middle[0]);
    draw_mix(rect, report::PRODUCT_MIX_TITLE, &dashboard.product_mix, middle[1]);
    draw_age_bars(rect, &dashboard.age_mix, middle[2]);
    draw_trend(rect, app, rows[2]);
}

fn draw_filters<B: Backend>(rect: &mut Frame<B>, app: &App, area: Rect) {
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 4); 4].as_ref())
        .split(area);

    for (field, area) in Field::FILTERS.iter().zip(areas) {
        let focused = app.focused_field() == *field;
        let items: Vec<ListItem> = app
            .dataset()
            .options(*field)
            .iter()
            .map(|value| {
                let mark = if app.selection().contains(*field, value) { "[x]" } else { "[ ]" };
                ListItem::new(format!("{} {}", mark, value))
            })
            .collect();

        let border_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .title(field.title())
                    .borders(Borders::ALL)
                    .border_style(border_style),
            )
            .highlight_style(Style::default().bg(PRIMARY).fg(Color::White).add_modifier(Modifier::BOLD));

        let mut state = ListState::default();
        if focused && !app.dataset().options(*field).is_empty() {
            state.select(Some(app.cursor(*field)));
        }
        rect.render_stateful_widget(list, area, &mut state);
    }
}

/// Raw view of the filtered records with their derived columns.
fn draw_table<B: Backend>(rect: &mut Frame<B>, app: &App, area: Rect) {
    let records = app.filtered();
    let rows = records.iter().map(|record| {
        Row::new(vec![
            Cell::from(record.timestamp.clone()),
            Cell::from(record.age.to_string()),
            Cell::from(record.sex.label()),
            Cell::from(record.product.to_string()),
            Cell::from(record.age_decade_label()),
            Cell::from(record.year_label()),
            Cell::from(record.month_label()),
        ])
    });
    let header = Row::new(TABLE_HEADERS.iter().copied())
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let title = format!("データ ({} 件)", records.len().to_formatted_string(&Locale::en));
    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL))
        .widths(&TABLE_WIDTHS)
        .column_spacing(1)
        .highlight_style(Style::default().bg(PRIMARY).fg(Color::White));

    let mut state = TableState::default();
    if !records.is_empty() {
        state.select(Some(app.table_row()));
    }
    rect.render_stateful_widget(table, area, &mut state);
}

fn card<'a>(app: &App) -> Paragraph<'a> {
    let dashboard = app.dashboard();
    let lines = vec![
        Spans::from(Span::raw(dashboard.card_title.clone())),
        Spans::from(Span::raw("")),
        Spans::from(Span::styled(
            dashboard.total.to_formatted_string(&Locale::en),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().bg(PRIMARY).fg(Color::White))
        .alignment(Alignment::Center)
}

fn badges<'a>(app: &App) -> Paragraph<'a> {
    let lines: Vec<Spans> = app
        .dashboard()
        .badges
        .iter()
        .map(|badge| {
            Spans::from(vec![
                Span::styled(
                    format!("{} ", badge.dimension),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(badge.values.clone(), Style::default().fg(PRIMARY).bg(PALE)),
            ])
        })
        .collect();
    Paragraph::new(lines)
        .block(Block::default().title("フィルタ条件").borders(Borders::ALL))
        .wrap(Wrap { trim: true })
}

/// Proportion chart: one gauge per label.
fn draw_mix<B: Backend>(rect: &mut Frame<B>, title: &str, shares: &[Share], area: Rect) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    rect.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let visible = shares.iter().take(inner.height as usize).collect::<Vec<_>>();
    for (i, share) in visible.iter().enumerate() {
        let (bar, text) = MIX_COLORS[i % MIX_COLORS.len()];
        let row = Rect::new(inner.x, inner.y + i as u16, inner.width, 1);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(bar).bg(Color::Black))
            .ratio((share.percent / 100.0).clamp(0.0, 1.0))
            .label(Span::styled(
                format!(
                    "{} {:.1}% ({})",
                    share.label,
                    share.percent,
                    share.count.to_formatted_string(&Locale::en)
                ),
                Style::default().fg(text),
            ));
        rect.render_widget(gauge, row);
    }
}

fn draw_age_bars<B: Backend>(rect: &mut Frame<B>, shares: &[Share], area: Rect) {
    let data: Vec<(&str, u64)> = shares
        .iter()
        .map(|s| (s.label.as_str(), s.percent.round() as u64))
        .collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .title(format!("{} (%)", report::AGE_MIX_TITLE))
                .borders(Borders::ALL),
        )
        .data(&data)
        .max(100)
        .bar_width(6)
        .bar_gap(1)
        .bar_style(Style::default().fg(PRIMARY))
        .value_style(Style::default().fg(Color::White).bg(PRIMARY))
        .label_style(Style::default().fg(Color::Gray));
    rect.render_widget(chart, area);
}

fn draw_trend<B: Backend>(rect: &mut Frame<B>, app: &App, area: Rect) {
    let monthly = &app.dashboard().monthly;
    let block = Block::default().title(report::TREND_TITLE).borders(Borders::ALL);
    if monthly.months.is_empty() || area.height < 5 || area.width < 20 {
        rect.render_widget(
            Paragraph::new("該当データなし").block(block).alignment(Alignment::Center),
            area,
        );
        return;
    }

    let points: Vec<Vec<(f64, f64)>> = monthly
        .lines
        .iter()
        .map(|(_, values)| {
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64, *v as f64))
                .collect()
        })
        .collect();

    // Newest year drawn last so it sits on top.
    let datasets = monthly
        .lines
        .iter()
        .zip(&points)
        .zip(TREND_COLORS)
        .map(|(((year, _), data), color)| {
            Dataset::default()
                .name(year.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color))
                .data(data)
        })
        .collect();

    let last = monthly.months.len() - 1;
    let x_labels = vec![
        Span::raw(monthly.months[0].clone()),
        Span::raw(monthly.months[last / 2].clone()),
        Span::raw(monthly.months[last].clone()),
    ];
    let y_max = (monthly.max_value() as f64 * 1.1).max(1.0);
    let y_labels = vec![
        Span::raw("0"),
        Span::raw(format!("{:.0}", y_max / 2.0)),
        Span::raw(format!("{:.0}", y_max)),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("月")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, last.max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("件数")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(y_labels),
        );
    rect.render_widget(chart, area);
}
