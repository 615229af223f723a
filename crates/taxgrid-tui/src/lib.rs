// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use taxgrid_app::{
    Bounds, Country, EditField, EditState, GenderCategory, GridColumn, GridCommand, GridEvent,
    GridRow, LoadState, PointerBus, RecordGateway, RecordGrid, SaveRequest, Shell, TaxRecord,
    TransportError,
};

const FILTER_MARK: &str = "▼";
const FILTER_MARK_OPEN: &str = "▲";
const CHECKED: &str = "[x]";
const UNCHECKED: &str = "[ ]";
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const COLUMN_WIDTHS: [Constraint; 5] = [
    Constraint::Percentage(30),
    Constraint::Percentage(15),
    Constraint::Percentage(20),
    Constraint::Percentage(28),
    Constraint::Percentage(7),
];
const COUNTRY_COLUMN: usize = 3;
const FILTER_PANEL_MIN_WIDTH: u16 = 24;
// Rows inside the editor block before the country value line.
const EDITOR_COUNTRY_LINE: u16 = 6;

#[derive(Debug)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    SaveFinished(Result<TaxRecord, TransportError>),
}

#[derive(Debug)]
struct ViewData {
    grid: RecordGrid,
    status: Option<String>,
    status_token: u64,
    help_visible: bool,
}

impl ViewData {
    fn new(page_size: usize) -> Self {
        Self {
            grid: RecordGrid::new(PointerBus::new(), page_size),
            status: None,
            status_token: 0,
            help_visible: false,
        }
    }
}

/// Screen regions shared by rendering and pointer hit-testing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScreenLayout {
    header: Rect,
    body: Rect,
    status: Rect,
}

/// Load both lists, then run the grid until the user quits. Saves run on a
/// worker thread so the modal can show its saving state.
pub fn run_app<G>(shell: &mut Shell, gateway: &G, page_size: usize) -> Result<()>
where
    G: RecordGateway + Clone + Send + Sync + 'static,
{
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(page_size);
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = terminal
        .draw(|frame| render(frame, shell, &view_data))
        .map(|_| ())
        .context("draw frame");
    if result.is_ok() {
        shell.load(gateway);
        view_data.grid.sync(&shell.records);
        result = event_loop(
            &mut terminal,
            shell,
            gateway,
            &mut view_data,
            &internal_tx,
            &internal_rx,
        );
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(
        io::stdout(),
        DisableMouseCapture,
        terminal::LeaveAlternateScreen
    )
    .context("leave alternate screen")?;
    result
}

fn event_loop<G>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    shell: &mut Shell,
    gateway: &G,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    internal_rx: &Receiver<InternalEvent>,
) -> Result<()>
where
    G: RecordGateway + Clone + Send + Sync + 'static,
{
    loop {
        process_internal_events(shell, view_data, internal_tx, internal_rx);

        terminal
            .draw(|frame| render(frame, shell, view_data))
            .context("draw frame")?;

        if !event::poll(Duration::from_millis(120)).context("poll event")? {
            continue;
        }
        match event::read().context("read event")? {
            Event::Key(key) => {
                if handle_key_event(shell, gateway, view_data, internal_tx, key) {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => {
                let area = terminal.get_frame().area();
                handle_mouse_event(shell, gateway, view_data, internal_tx, area, mouse);
            }
            _ => {}
        }
    }
}

fn process_internal_events(
    shell: &mut Shell,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status = None;
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::SaveFinished(result) => {
                apply_save_result(shell, view_data, tx, result);
            }
        }
    }
}

fn apply_save_result(
    shell: &mut Shell,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    result: Result<TaxRecord, TransportError>,
) {
    let mut saved_name = None;
    let outcome = view_data.grid.finish_edit(result, |record| {
        saved_name = Some(record.name.clone());
        shell.replace_record(record);
    });
    view_data.grid.sync(&shell.records);
    match (outcome, saved_name) {
        (Ok(()), Some(name)) => emit_status(view_data, tx, format!("saved {name}")),
        (Ok(()), None) => {}
        (Err(error), _) => emit_status(view_data, tx, format!("save failed: {error}")),
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn spawn_save<G>(gateway: &G, request: SaveRequest, internal_tx: &Sender<InternalEvent>)
where
    G: RecordGateway + Clone + Send + 'static,
{
    let gateway = gateway.clone();
    let sender = internal_tx.clone();
    thread::spawn(move || {
        let result = gateway.update_record(&request.id, &request.body);
        let _ = sender.send(InternalEvent::SaveFinished(result));
    });
}

fn start_save<G>(gateway: &G, view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>)
where
    G: RecordGateway + Clone + Send + 'static,
{
    match view_data.grid.editor_mut().begin_save() {
        Ok(request) => {
            tracing::debug!(record = %request.id, "save started");
            spawn_save(gateway, request, internal_tx);
        }
        Err(error) => emit_status(view_data, internal_tx, error.to_string()),
    }
}

fn dispatch_grid<G: RecordGateway + ?Sized>(
    shell: &Shell,
    gateway: &G,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: GridCommand,
) {
    let events = view_data
        .grid
        .dispatch(&shell.records, &shell.countries, command);
    for event in events {
        if let Some(message) = event.message() {
            emit_status(view_data, internal_tx, message);
        }
        if let GridEvent::EditRequested(record) = event {
            view_data.grid.open_editor(record, gateway);
        }
    }
}

fn handle_key_event<G>(
    shell: &Shell,
    gateway: &G,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool
where
    G: RecordGateway + Clone + Send + 'static,
{
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if shell.load != LoadState::Ready {
        return key.code == KeyCode::Char('q');
    }

    if view_data.grid.editor().is_open() {
        handle_editor_key(gateway, view_data, internal_tx, key);
        return false;
    }

    if view_data.grid.panel().is_open() {
        handle_filter_panel_key(shell, gateway, view_data, internal_tx, key);
        return false;
    }

    let command = match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => {
            view_data.help_visible = true;
            return false;
        }
        KeyCode::Char('j') | KeyCode::Down => GridCommand::MoveRow(1),
        KeyCode::Char('k') | KeyCode::Up => GridCommand::MoveRow(-1),
        KeyCode::Char('n') | KeyCode::Char('l') | KeyCode::Right | KeyCode::PageDown => {
            GridCommand::NextPage
        }
        KeyCode::Char('p') | KeyCode::Char('h') | KeyCode::Left | KeyCode::PageUp => {
            GridCommand::PreviousPage
        }
        KeyCode::Char('g') | KeyCode::Home => GridCommand::FirstPage,
        KeyCode::Char('G') | KeyCode::End => GridCommand::LastPage,
        KeyCode::Char('f') => GridCommand::ToggleFilterPanel,
        KeyCode::Char('c') => GridCommand::ClearFilter,
        KeyCode::Char('e') | KeyCode::Enter => GridCommand::EditSelected,
        _ => return false,
    };
    dispatch_grid(shell, gateway, view_data, internal_tx, command);
    false
}

fn handle_filter_panel_key<G: RecordGateway + ?Sized>(
    shell: &Shell,
    gateway: &G,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let command = match key.code {
        KeyCode::Esc | KeyCode::Char('f') => GridCommand::CloseFilterPanel,
        KeyCode::Char('j') | KeyCode::Down => GridCommand::MoveFilterCursor(1),
        KeyCode::Char('k') | KeyCode::Up => GridCommand::MoveFilterCursor(-1),
        KeyCode::Char(' ') | KeyCode::Enter => GridCommand::ToggleCountryAtCursor,
        KeyCode::Char('c') => GridCommand::ClearFilter,
        _ => return,
    };
    dispatch_grid(shell, gateway, view_data, internal_tx, command);
}

fn handle_editor_key<G>(
    gateway: &G,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) where
    G: RecordGateway + Clone + Send + 'static,
{
    if view_data.grid.editor().is_saving() {
        return;
    }

    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        start_save(gateway, view_data, internal_tx);
        return;
    }

    let editor = view_data.grid.editor_mut();
    if editor.dropdown().is_open() {
        match key.code {
            KeyCode::Esc => editor.close_country_dropdown(),
            KeyCode::Char('j') | KeyCode::Down => editor.move_dropdown_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => editor.move_dropdown_cursor(-1),
            KeyCode::Enter | KeyCode::Char(' ') => editor.select_highlighted_country(),
            KeyCode::Tab | KeyCode::BackTab => editor.cycle_focus(),
            _ => {}
        }
        return;
    }

    match (key.code, editor.focus()) {
        (KeyCode::Esc, _) => {
            if editor.cancel() {
                emit_status(view_data, internal_tx, "edit canceled");
            }
        }
        (KeyCode::Tab | KeyCode::BackTab, _) => editor.cycle_focus(),
        (KeyCode::Enter, EditField::Name) => start_save(gateway, view_data, internal_tx),
        (KeyCode::Backspace, EditField::Name) => editor.pop_name_char(),
        (KeyCode::Char(value), EditField::Name)
            if !key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            editor.push_name_char(value);
        }
        (KeyCode::Enter | KeyCode::Char(' '), EditField::Country) => {
            editor.toggle_country_dropdown();
        }
        _ => {}
    }
}

fn handle_mouse_event<G: RecordGateway + ?Sized>(
    shell: &Shell,
    gateway: &G,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    area: Rect,
    mouse: MouseEvent,
) {
    if !matches!(mouse.kind, MouseEventKind::Down(_)) || shell.load != LoadState::Ready {
        return;
    }
    let (column, row) = (mouse.column, mouse.row);
    let dropdown_was_open = view_data.grid.editor().dropdown().is_open();
    let panel_was_open = view_data.grid.panel().is_open();
    view_data.grid.pointer_pressed(column, row);

    if view_data.grid.editor().is_open() {
        handle_editor_click(view_data, internal_tx, area, dropdown_was_open, column, row);
        return;
    }

    // A press while the panel was open only dismisses it or toggles a
    // country; the Country header must not reopen it.
    let layout = screen_layout(area);
    if panel_was_open {
        let panel = filter_panel_rect(layout.body, shell.countries.len());
        if let Some(index) = list_index_at(panel, column, row)
            && let Some(country) = shell.countries.get(index)
        {
            let command = GridCommand::ToggleCountry(country.name.clone());
            dispatch_grid(shell, gateway, view_data, internal_tx, command);
        }
        return;
    }

    let inner = table_inner(layout.body);
    let columns = column_rects(inner);
    if row == inner.y && rect_contains(columns[COUNTRY_COLUMN], column, row) {
        dispatch_grid(
            shell,
            gateway,
            view_data,
            internal_tx,
            GridCommand::ToggleFilterPanel,
        );
        return;
    }

    let Some(index) = row
        .checked_sub(inner.y + 1)
        .map(usize::from)
        .filter(|index| *index < view_data.grid.page_records(&shell.records).len())
    else {
        return;
    };
    let delta = index as isize - view_data.grid.selected_row() as isize;
    dispatch_grid(
        shell,
        gateway,
        view_data,
        internal_tx,
        GridCommand::MoveRow(delta),
    );
    if rect_contains(columns[GridColumn::ALL.len() - 1], column, row) {
        dispatch_grid(
            shell,
            gateway,
            view_data,
            internal_tx,
            GridCommand::EditSelected,
        );
    }
}

fn handle_editor_click(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    area: Rect,
    dropdown_was_open: bool,
    column: u16,
    row: u16,
) {
    if view_data.grid.editor().is_saving() {
        return;
    }
    let modal = modal_rect(area);
    let editor = view_data.grid.editor_mut();

    if dropdown_was_open {
        let dropdown = dropdown_rect(modal, area, editor.countries().len());
        if let Some(index) = list_index_at(dropdown, column, row)
            && let Some(name) = editor
                .countries()
                .get(index)
                .map(|country| country.name.clone())
        {
            editor.select_country(name);
            return;
        }
        if rect_contains(dropdown, column, row) {
            return;
        }
    }

    if !rect_contains(modal, column, row) {
        if editor.cancel() {
            emit_status(view_data, internal_tx, "edit canceled");
        }
        return;
    }

    let inner = Block::default().borders(Borders::ALL).inner(modal);
    if row == inner.y + EDITOR_COUNTRY_LINE && !dropdown_was_open {
        editor.toggle_country_dropdown();
    }
}

fn screen_layout(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(area);
    ScreenLayout {
        header: chunks[0],
        body: chunks[1],
        status: chunks[2],
    }
}

fn table_inner(body: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(body)
}

fn column_rects(inner: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(COLUMN_WIDTHS)
        .spacing(1)
        .split(inner)
}

/// Filter panel anchored under the Country header.
fn filter_panel_rect(body: Rect, countries: usize) -> Rect {
    let inner = table_inner(body);
    let anchor = column_rects(inner)[COUNTRY_COLUMN];
    let y = inner.y.saturating_add(1);
    let right = body.x.saturating_add(body.width);
    let width = anchor
        .width
        .max(FILTER_PANEL_MIN_WIDTH)
        .min(right.saturating_sub(anchor.x));
    let wanted = u16::try_from(countries).unwrap_or(u16::MAX).saturating_add(2);
    let height = wanted.min(body.y.saturating_add(body.height).saturating_sub(y));
    Rect::new(anchor.x, y, width, height)
}

fn modal_rect(area: Rect) -> Rect {
    centered_rect(60, 50, area)
}

/// Country dropdown opening below the country field; may overflow the modal.
fn dropdown_rect(modal: Rect, area: Rect, countries: usize) -> Rect {
    let inner = Block::default().borders(Borders::ALL).inner(modal);
    let y = inner.y.saturating_add(EDITOR_COUNTRY_LINE + 1);
    let wanted = u16::try_from(countries).unwrap_or(u16::MAX).saturating_add(2);
    let height = wanted.min(area.y.saturating_add(area.height).saturating_sub(y));
    Rect::new(inner.x, y, inner.width, height)
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn bounds(rect: Rect) -> Bounds {
    Bounds::new(rect.x, rect.y, rect.width, rect.height)
}

fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    bounds(rect).contains(column, row)
}

/// Index of the bordered list entry under the pointer, if any.
fn list_index_at(rect: Rect, column: u16, row: u16) -> Option<usize> {
    let inner = Block::default().borders(Borders::ALL).inner(rect);
    if !rect_contains(inner, column, row) {
        return None;
    }
    Some(usize::from(row - inner.y))
}

fn render(frame: &mut ratatui::Frame<'_>, shell: &Shell, view_data: &ViewData) {
    let area = frame.area();
    let layout = screen_layout(area);

    let header = Paragraph::new(header_text(shell, &view_data.grid))
        .block(Block::default().title("taxgrid").borders(Borders::ALL));
    frame.render_widget(header, layout.header);

    match &shell.load {
        LoadState::Loading => {
            let body = Paragraph::new("Loading...")
                .block(Block::default().borders(Borders::ALL).title("records"));
            frame.render_widget(body, layout.body);
        }
        LoadState::Failed(message) => {
            let body = Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::Red))
                .block(Block::default().borders(Borders::ALL).title("records"));
            frame.render_widget(body, layout.body);
        }
        LoadState::Ready => render_table(frame, layout.body, shell, &view_data.grid),
    }

    let status = Paragraph::new(status_text(shell, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout.status);

    if shell.load != LoadState::Ready {
        return;
    }

    let panel = view_data.grid.panel();
    if panel.is_open() {
        let rect = filter_panel_rect(layout.body, shell.countries.len());
        panel.popover().set_bounds(bounds(rect));
        frame.render_widget(Clear, rect);
        let lines = filter_panel_lines(&shell.countries, &view_data.grid)
            .into_iter()
            .enumerate()
            .map(|(index, text)| highlight_line(text, index == panel.cursor()))
            .collect::<Vec<_>>();
        let widget = Paragraph::new(lines).block(
            Block::default()
                .title("filter by country")
                .borders(Borders::ALL),
        );
        frame.render_widget(widget, rect);
    }

    let editor = view_data.grid.editor();
    if editor.is_open() {
        render_editor(frame, area, &view_data.grid);
    }

    if view_data.help_visible {
        let rect = centered_rect(60, 60, area);
        frame.render_widget(Clear, rect);
        let help = Paragraph::new(help_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, rect);
    }
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, shell: &Shell, grid: &RecordGrid) {
    let header = Row::new(
        GridColumn::ALL
            .iter()
            .map(|column| Cell::from(column_header(*column, grid))),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows = grid
        .page_rows(&shell.records)
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            let style = if index == grid.selected_row() {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Row::new(GridColumn::ALL.iter().map(|column| grid_cell(&row, *column))).style(style)
        })
        .collect::<Vec<_>>();

    let title = page_footer_text(shell, grid);
    let table = Table::new(rows, COLUMN_WIDTHS)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn grid_cell(row: &GridRow, column: GridColumn) -> Cell<'static> {
    let text = row.cell(column).to_owned();
    match column {
        GridColumn::Gender => Cell::from(Span::styled(
            format!(" {text} "),
            gender_style(row.gender_category),
        )),
        GridColumn::Action => Cell::from(text).style(Style::default().fg(Color::Cyan)),
        _ => Cell::from(text),
    }
}

fn gender_style(category: GenderCategory) -> Style {
    let (red, green, blue) = category.rgb();
    Style::default()
        .fg(Color::Black)
        .bg(Color::Rgb(red, green, blue))
}

fn column_header(column: GridColumn, grid: &RecordGrid) -> String {
    if column != GridColumn::Country {
        return column.label().to_owned();
    }
    let mark = if grid.panel().is_open() {
        FILTER_MARK_OPEN
    } else {
        FILTER_MARK
    };
    match grid.filter().len() {
        0 => format!("{} {mark}", column.label()),
        selected => format!("{} {mark} ({selected})", column.label()),
    }
}

fn render_editor(frame: &mut ratatui::Frame<'_>, area: Rect, grid: &RecordGrid) {
    let editor = grid.editor();
    let modal = modal_rect(area);
    frame.render_widget(Clear, modal);

    let focus_style = |field: EditField| {
        if editor.focus() == field {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };
    let mut lines = editor_lines(grid)
        .into_iter()
        .map(Line::from)
        .collect::<Vec<_>>();
    if let Some(line) = lines.get_mut(0) {
        *line = line.clone().style(Style::default().fg(Color::Red));
    }
    if let Some(line) = lines.get_mut(3) {
        *line = line.clone().style(focus_style(EditField::Name));
    }
    if let Some(line) = lines.get_mut(usize::from(EDITOR_COUNTRY_LINE)) {
        *line = line.clone().style(focus_style(EditField::Country));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title("Edit Customer")
            .borders(Borders::ALL),
    );
    frame.render_widget(widget, modal);

    let dropdown = editor.dropdown();
    if dropdown.is_open() {
        let rect = dropdown_rect(modal, area, editor.countries().len());
        dropdown.popover().set_bounds(bounds(rect));
        frame.render_widget(Clear, rect);
        let lines = editor
            .countries()
            .iter()
            .enumerate()
            .map(|(index, country)| {
                highlight_line(country.name.clone(), index == dropdown.cursor())
            })
            .collect::<Vec<_>>();
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
            rect,
        );
    }
}

fn highlight_line(text: String, highlighted: bool) -> Line<'static> {
    if highlighted {
        Line::styled(text, Style::default().add_modifier(Modifier::REVERSED))
    } else {
        Line::from(text)
    }
}

fn header_text(shell: &Shell, grid: &RecordGrid) -> String {
    match shell.load {
        LoadState::Loading => "loading records".to_owned(),
        LoadState::Failed(_) => "offline".to_owned(),
        LoadState::Ready => {
            let visible = grid.filtered(&shell.records).len();
            if grid.filter().is_empty() {
                format!("{visible} records")
            } else {
                let countries = grid.filter().selected().collect::<Vec<_>>().join(", ");
                format!("{visible} of {} records | {countries}", shell.records.len())
            }
        }
    }
}

fn page_footer_text(shell: &Shell, grid: &RecordGrid) -> String {
    let total = grid.filtered(&shell.records).len();
    let pages = grid.pagination().page_count(total);
    if pages == 0 {
        return "no records".to_owned();
    }
    format!("page {} of {pages}", grid.pagination().page_index() + 1)
}

fn filter_panel_lines(countries: &[Country], grid: &RecordGrid) -> Vec<String> {
    countries
        .iter()
        .map(|country| {
            let mark = if grid.filter().is_selected(&country.name) {
                CHECKED
            } else {
                UNCHECKED
            };
            format!("{mark} {}", country.name)
        })
        .collect()
}

/// Editor body, one entry per screen line.
fn editor_lines(grid: &RecordGrid) -> Vec<String> {
    let editor = grid.editor();
    let error = editor.error().unwrap_or_default().to_owned();
    let country = if editor.country().is_empty() {
        "Select country".to_owned()
    } else {
        editor.country().to_owned()
    };
    let actions = match editor.state() {
        EditState::Saving => "Saving...".to_owned(),
        _ if editor.can_save() => "[esc] Cancel   [ctrl+s] Save".to_owned(),
        _ => "[esc] Cancel   [ctrl+s] Save (disabled)".to_owned(),
    };
    vec![
        error,
        String::new(),
        "Name *".to_owned(),
        format!("{}_", editor.name()),
        String::new(),
        "Country".to_owned(),
        format!("{country} {FILTER_MARK}"),
        String::new(),
        actions,
    ]
}

fn status_text(shell: &Shell, view_data: &ViewData) -> String {
    let hints = if shell.load != LoadState::Ready {
        "q quit"
    } else if view_data.grid.editor().is_open() {
        "tab field | enter pick | ctrl+s save | esc cancel"
    } else if view_data.grid.panel().is_open() {
        "j/k move | space toggle | c clear | esc close"
    } else {
        "j/k row | n/p page | g/G ends | f filter | e edit | ? help | q quit"
    };
    match &view_data.status {
        Some(status) => format!("{status} | {hints}"),
        None => hints.to_owned(),
    }
}

fn help_text() -> String {
    [
        "j/k, up/down     move row",
        "n/p, left/right  next/previous page",
        "g/G              first/last page",
        "f                country filter",
        "c                clear filter",
        "e, enter         edit selected record",
        "mouse            click ✎ to edit, Country header to filter",
        "q, ctrl+c        quit",
    ]
    .join("\n")
}
