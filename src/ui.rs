use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, List, ListItem, ListState, Paragraph, Wrap,
    },
    Frame, Terminal,
};
use std::io;
use voucher_map::render::{self, CardColumns, Column, DerivedView, MapPoint, INITIAL_VIEW};
use voucher_map::{Action, Dataset, FilterSelection, MerchantRecord, SelectionState, VoucherType};

/// Degrees of padding around the data when fitting the map
const MAP_PADDING: f64 = 0.01;

pub struct App {
    pub dataset: Dataset,
    pub selection: SelectionState,
    pub view: DerivedView,
    pub focus: Column,
    pub left_state: ListState,
    pub right_state: ListState,
    pub show_detail: bool,
    pub notice: Option<String>,
    pub skipped_rows: usize,
}

impl App {
    pub fn new(dataset: Dataset, notice: Option<String>, skipped_rows: usize) -> Self {
        let selection = SelectionState::new();
        let view = render::render(&dataset, selection.current());

        let mut app = Self {
            dataset,
            selection,
            view,
            focus: Column::Left,
            left_state: ListState::default(),
            right_state: ListState::default(),
            show_detail: false,
            notice,
            skipped_rows,
        };
        app.reset_cursor();
        app
    }

    /// Apply a user action and recompute the whole view
    pub fn dispatch(&mut self, action: Action) {
        self.selection.apply(action);
        self.refresh();
    }

    pub fn refresh(&mut self) {
        self.view = render::render(&self.dataset, self.selection.current());
        self.reset_cursor();
    }

    fn reset_cursor(&mut self) {
        self.focus = Column::Left;
        self.left_state
            .select(if self.view.columns.left.is_empty() { None } else { Some(0) });
        self.right_state
            .select(if self.view.columns.right.is_empty() { None } else { Some(0) });
    }

    fn column(&self, column: Column) -> &[MerchantRecord] {
        match column {
            Column::Left => &self.view.columns.left,
            Column::Right => &self.view.columns.right,
        }
    }

    fn column_state(&mut self, column: Column) -> &mut ListState {
        match column {
            Column::Left => &mut self.left_state,
            Column::Right => &mut self.right_state,
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn switch_column(&mut self) {
        let other = self.focus.other();
        if !self.column(other).is_empty() {
            self.focus = other;
        }
    }

    /// Index into `view.filtered_records` of the highlighted card
    pub fn selected_index(&self) -> Option<usize> {
        let state = match self.focus {
            Column::Left => &self.left_state,
            Column::Right => &self.right_state,
        };
        state
            .selected()
            .map(|row| CardColumns::source_index(self.focus, row))
            .filter(|i| *i < self.view.filtered_records.len())
    }

    /// Map point of the highlighted card; its label is the tooltip text
    pub fn selected_point(&self) -> Option<&MapPoint> {
        self.selected_index().and_then(|i| self.view.map_layer.get(i))
    }

    pub fn next(&mut self) {
        let len = self.column(self.focus).len();
        if len == 0 {
            return;
        }
        let focus = self.focus;
        let state = self.column_state(focus);
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.column(self.focus).len();
        if len == 0 {
            return;
        }
        let focus = self.focus;
        let state = self.column_state(focus);
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }
}

/// Selection buttons: key hint, action, selection it produces
const BUTTONS: [(&str, Action, FilterSelection); 3] = [
    ("1", Action::SelectTmoney, FilterSelection::Tmoney),
    ("2", Action::SelectCulture, FilterSelection::Culture),
    ("0", Action::SelectAll, FilterSelection::All),
];

pub fn action_for(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('1') | KeyCode::Char('t') => Some(Action::SelectTmoney),
        KeyCode::Char('2') | KeyCode::Char('c') => Some(Action::SelectCulture),
        KeyCode::Char('0') | KeyCode::Char('a') => Some(Action::SelectAll),
        _ => None,
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Some(action) = action_for(key.code) {
            app.dispatch(action);
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Enter => app.toggle_detail(),
            KeyCode::Tab | KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => {
                app.switch_column()
            }
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            _ => {}
        }
    }
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Hero
            Constraint::Length(3), // Buttons
            Constraint::Length(4), // KPI tiles
            Constraint::Min(0),    // Map + cards
            Constraint::Length(4), // Status bar
        ])
        .split(f.size());

    render_hero(f, chunks[0]);
    render_buttons(f, chunks[1], app);
    render_kpis(f, chunks[2], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[3]);

    let map_constraints = if app.show_detail {
        vec![Constraint::Min(0), Constraint::Length(1), Constraint::Length(7)]
    } else {
        vec![Constraint::Min(0), Constraint::Length(1)]
    };
    let map_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(map_constraints)
        .split(body[0]);

    render_map(f, map_chunks[0], app);
    render_legend(f, map_chunks[1]);
    if app.show_detail {
        render_detail_panel(f, map_chunks[2], app);
    }

    render_cards(f, body[1], app);
    render_status_bar(f, chunks[4], app);
}

fn voucher_color(voucher_type: VoucherType) -> Color {
    let [r, g, b] = voucher_type.rgb();
    Color::Rgb(r, g, b)
}

fn selection_color(selection: FilterSelection) -> Color {
    selection
        .voucher_type()
        .map(voucher_color)
        .unwrap_or(Color::White)
}

fn render_hero(f: &mut Frame, area: Rect) {
    let hero = Paragraph::new(Line::from(vec![
        Span::styled(
            " 🗺️ Seocho-gu · Giftcard Map ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            "T-money & Culture Voucher merchants at a glance",
            Style::default().fg(Color::Gray),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(139, 92, 246))),
    );

    f.render_widget(hero, area);
}

fn render_buttons(f: &mut Frame, area: Rect, app: &App) {
    let active = app.selection.current();

    let mut spans = vec![Span::raw(" ")];
    for (i, (key, _, selection)) in BUTTONS.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }

        let color = selection_color(*selection);
        let label = format!(" [{}] {} ", key, selection.title());
        let style = if *selection == active {
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        spans.push(Span::styled(label, style));
    }

    let buttons = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Voucher "),
    );

    f.render_widget(buttons, area);
}

fn render_kpis(f: &mut Frame, area: Rect, app: &App) {
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let kpis = app.view.kpis;
    let entries = [
        ("Total merchants", kpis.total, Color::White),
        ("T-money", kpis.tmoney_count, voucher_color(VoucherType::Tmoney)),
        ("Culture Voucher", kpis.culture_count, voucher_color(VoucherType::Culture)),
    ];

    for (tile, (caption, value, color)) in tiles.iter().zip(entries) {
        let content = vec![
            Line::from(Span::styled(
                value.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(caption, Style::default().fg(Color::Gray))),
        ];
        let paragraph = Paragraph::new(content)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
        f.render_widget(paragraph, *tile);
    }
}

/// Lon/lat bounds fitted to the whole dataset, so the camera stays put while
/// filters change. Falls back to a window around the initial view.
pub fn map_bounds(dataset: &Dataset) -> ([f64; 2], [f64; 2]) {
    let mut points = dataset.iter().map(|r| (r.longitude, r.latitude));
    let Some((lon0, lat0)) = points.next() else {
        return (
            [INITIAL_VIEW.longitude - 0.05, INITIAL_VIEW.longitude + 0.05],
            [INITIAL_VIEW.latitude - 0.05, INITIAL_VIEW.latitude + 0.05],
        );
    };

    let (mut min_lon, mut max_lon, mut min_lat, mut max_lat) = (lon0, lon0, lat0, lat0);
    for (lon, lat) in points {
        min_lon = min_lon.min(lon);
        max_lon = max_lon.max(lon);
        min_lat = min_lat.min(lat);
        max_lat = max_lat.max(lat);
    }

    (
        [min_lon - MAP_PADDING, max_lon + MAP_PADDING],
        [min_lat - MAP_PADDING, max_lat + MAP_PADDING],
    )
}

fn render_map(f: &mut Frame, area: Rect, app: &App) {
    let (x_bounds, y_bounds) = map_bounds(&app.dataset);

    let coords_of = |voucher_type: VoucherType| -> Vec<(f64, f64)> {
        app.view
            .map_layer
            .iter()
            .filter(|p| p.voucher_type == voucher_type)
            .map(|p| (p.position[0], p.position[1]))
            .collect()
    };
    let tmoney = coords_of(VoucherType::Tmoney);
    let culture = coords_of(VoucherType::Culture);

    let highlighted = app
        .selected_point()
        .map(|p| (p.position, p.name.clone()));

    let title = format!(" Map · {} ", app.view.selection.title());
    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(move |ctx| {
            ctx.draw(&Points {
                coords: &tmoney,
                color: voucher_color(VoucherType::Tmoney),
            });
            ctx.draw(&Points {
                coords: &culture,
                color: voucher_color(VoucherType::Culture),
            });

            if let Some(([lon, lat], name)) = &highlighted {
                ctx.layer();
                ctx.print(
                    *lon,
                    *lat,
                    Span::styled(
                        format!("◉ {}", name),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });

    f.render_widget(canvas, area);
}

fn render_legend(f: &mut Frame, area: Rect) {
    let legend = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled("●", Style::default().fg(voucher_color(VoucherType::Tmoney))),
        Span::raw(" T-money   "),
        Span::styled("●", Style::default().fg(voucher_color(VoucherType::Culture))),
        Span::raw(" Culture Voucher"),
    ]));

    f.render_widget(legend, area);
}

fn card_item(record: &MerchantRecord) -> ListItem<'static> {
    let color = voucher_color(record.voucher_type);
    ListItem::new(vec![
        Line::from(vec![
            Span::styled(
                record.name.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!(" {} ", record.voucher_type.display_name()),
                Style::default().fg(Color::Black).bg(color),
            ),
        ]),
        Line::from(Span::styled(
            record.category.clone(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            record.address.clone(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ])
}

fn render_cards(f: &mut Frame, area: Rect, app: &mut App) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (column, half) in [Column::Left, Column::Right].into_iter().zip(halves.iter()) {
        let items: Vec<ListItem> = app.column(column).iter().map(card_item).collect();
        let focused = app.focus == column;

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(if focused { Color::Yellow } else { Color::DarkGray }))
                    .title(match column {
                        Column::Left => " Merchants ",
                        Column::Right => "",
                    }),
            )
            .highlight_style(if focused {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            })
            .highlight_symbol(if focused { "▶ " } else { "  " });

        f.render_stateful_widget(list, *half, app.column_state(column));
    }
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.selected_point() {
        Some(point) => {
            let color = voucher_color(point.voucher_type);
            let mut lines: Vec<Line> = point
                .label
                .lines()
                .enumerate()
                .map(|(i, text)| {
                    let style = match i {
                        0 => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                        1 => Style::default().fg(color),
                        _ => Style::default(),
                    };
                    Line::from(Span::styled(text.to_string(), style))
                })
                .collect();
            lines.push(Line::from(Span::styled(
                format!("{:.4}, {:.4}", point.position[1], point.position[0]),
                Style::default().fg(Color::DarkGray),
            )));
            lines
        }
        None => vec![Line::from(Span::styled(
            "No merchant selected",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))],
    };

    let panel = Paragraph::new(content).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Details "),
    );

    f.render_widget(panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let mut spans = vec![
        Span::raw(" "),
        key("1/2/0"),
        Span::raw(" Filter | "),
        key("Tab"),
        Span::raw(" Column | "),
        key("↑/↓"),
        Span::raw(" Nav | "),
        key("Enter"),
        Span::raw(" Details | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    if app.skipped_rows > 0 {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("{} rows skipped", app.skipped_rows),
            Style::default().fg(Color::Red),
        ));
    }

    let mut notes = vec![Span::raw(" ")];
    if let Some(notice) = &app.notice {
        notes.push(Span::styled(format!("💡 {}", notice), Style::default().fg(Color::Cyan)));
        notes.push(Span::raw(" | "));
    }
    notes.push(Span::styled(
        "※ Sample data: replace with real merchant data",
        Style::default().fg(Color::DarkGray),
    ));

    let status_bar = Paragraph::new(vec![Line::from(spans), Line::from(notes)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn sample_dataset() -> Dataset {
        Dataset::new(vec![
            MerchantRecord::new("Cafe X", "Cafe", "Seocho-daero 1", 37.48, 127.03, VoucherType::Tmoney),
            MerchantRecord::new("Bookshop Y", "Books", "Banpo-daero 2", 37.49, 127.04, VoucherType::Culture),
            MerchantRecord::new("Mart Z", "Mart", "Gangnam-daero 3", 37.47, 127.05, VoucherType::Tmoney),
        ])
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_app_starts_unfiltered() {
        let app = App::new(sample_dataset(), None, 0);
        assert_eq!(app.selection.current(), FilterSelection::All);
        assert_eq!(app.view.filtered_records.len(), 3);
        assert_eq!(app.selected_point().map(|p| p.name.as_str()), Some("Cafe X"));
    }

    #[test]
    fn test_dispatch_recomputes_view() {
        let mut app = App::new(sample_dataset(), None, 0);

        app.dispatch(Action::SelectTmoney);
        assert_eq!(app.view.selection, FilterSelection::Tmoney);
        assert_eq!(app.view.kpis.total, 2);
        assert_eq!(app.view.kpis.culture_count, 1);

        app.dispatch(Action::SelectCulture);
        assert_eq!(app.view.kpis.total, 1);
        assert_eq!(app.selected_point().map(|p| p.name.as_str()), Some("Bookshop Y"));

        app.dispatch(Action::SelectAll);
        assert_eq!(app.view.kpis.total, 3);
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(action_for(KeyCode::Char('1')), Some(Action::SelectTmoney));
        assert_eq!(action_for(KeyCode::Char('t')), Some(Action::SelectTmoney));
        assert_eq!(action_for(KeyCode::Char('2')), Some(Action::SelectCulture));
        assert_eq!(action_for(KeyCode::Char('c')), Some(Action::SelectCulture));
        assert_eq!(action_for(KeyCode::Char('0')), Some(Action::SelectAll));
        assert_eq!(action_for(KeyCode::Char('a')), Some(Action::SelectAll));
        assert_eq!(action_for(KeyCode::Char('q')), None);
    }

    #[test]
    fn test_navigation_across_columns() {
        let mut app = App::new(sample_dataset(), None, 0);

        // left column: Cafe X, Mart Z / right column: Bookshop Y
        app.next();
        assert_eq!(app.selected_point().map(|p| p.name.as_str()), Some("Mart Z"));
        app.next();
        assert_eq!(app.selected_point().map(|p| p.name.as_str()), Some("Cafe X"));
        app.previous();
        assert_eq!(app.selected_point().map(|p| p.name.as_str()), Some("Mart Z"));

        app.switch_column();
        assert_eq!(app.focus, Column::Right);
        assert_eq!(app.selected_point().map(|p| p.name.as_str()), Some("Bookshop Y"));
    }

    #[test]
    fn test_switch_column_skips_empty_column() {
        let mut app = App::new(sample_dataset(), None, 0);
        app.dispatch(Action::SelectCulture);
        app.switch_column();
        assert_eq!(app.focus, Column::Left);
    }

    #[test]
    fn test_empty_dataset_has_no_selection() {
        let mut app = App::new(Dataset::default(), None, 0);
        assert!(app.selected_point().is_none());
        app.next();
        app.previous();
        assert!(app.selected_point().is_none());
    }

    #[test]
    fn test_map_bounds_fit_dataset() {
        let (x, y) = map_bounds(&sample_dataset());
        assert!((x[0] - 127.02).abs() < 1e-9);
        assert!((x[1] - 127.06).abs() < 1e-9);
        assert!((y[0] - 37.46).abs() < 1e-9);
        assert!((y[1] - 37.50).abs() < 1e-9);
    }

    #[test]
    fn test_map_bounds_empty_dataset_centers_on_seocho() {
        let (x, y) = map_bounds(&Dataset::default());
        assert!(x[0] < INITIAL_VIEW.longitude && INITIAL_VIEW.longitude < x[1]);
        assert!(y[0] < INITIAL_VIEW.latitude && INITIAL_VIEW.latitude < y[1]);
    }

    #[test]
    fn test_draw_shows_kpis_cards_and_notice() {
        let mut app = App::new(sample_dataset(), Some("Add MAPBOX_API_KEY".to_string()), 2);
        let text = screen(&mut app);

        assert!(text.contains("Total merchants"));
        assert!(text.contains("[1] T-money"));
        assert!(text.contains("[2] Culture Voucher"));
        assert!(text.contains("[0] All"));
        assert!(text.contains("Cafe X"));
        assert!(text.contains("Bookshop Y"));
        assert!(text.contains("Add MAPBOX_API_KEY"));
        assert!(text.contains("2 rows skipped"));
        assert!(text.contains("Sample data"));
    }

    #[test]
    fn test_draw_after_filter_hides_other_type() {
        let mut app = App::new(sample_dataset(), None, 0);
        app.dispatch(Action::SelectTmoney);
        let text = screen(&mut app);

        assert!(text.contains("Map · T-money"));
        assert!(text.contains("Mart Z"));
        assert!(!text.contains("Bookshop Y"));
        assert!(text.contains("Sample data"));
    }

    #[test]
    fn test_draw_detail_panel() {
        let mut app = App::new(sample_dataset(), None, 0);
        app.toggle_detail();
        let text = screen(&mut app);
        assert!(text.contains("Details"));
        assert!(text.contains("Seocho-daero 1"));
        assert!(text.contains("• Cafe"));
        assert!(text.contains("37.4800, 127.0300"));
    }

    #[test]
    fn test_detail_panel_reads_map_point_label() {
        let app = App::new(sample_dataset(), None, 0);
        let point = app.selected_point().unwrap();
        assert_eq!(point.label, "Cafe X\n티머니 • Cafe\nSeocho-daero 1");
    }
}
