#![allow(clippy::collapsible_if)]

mod commands;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use serde_json::Value;

use loadout_core::catalog::{self, FileSource};
use loadout_core::config::{ConfigError, LoadoutConfig};
use loadout_core::index::AppState;
use loadout_core::keys::{KeySpace, slug};
use loadout_core::model::{ColumnKind, Menu};
use loadout_core::records::{BUILD_KINDS, BuildList, BuildRecord, TodoList, WishList};
use loadout_core::store::{FileStore, KeyValueStore, StoreError};
use loadout_core::transfer;
use loadout_core::view::{self, RowFilter};

use ui::styles;

#[derive(Parser)]
#[command(name = "loadout")]
#[command(about = "Track item checklists, wish lists, and builds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config and sample catalog
    Init {
        #[arg(short, long)]
        yes: bool,
    },
    /// Check config, catalog, and storage health
    Doctor,
    /// Open the tracker (default when no subcommand is given)
    Tui,
    /// Dump all persisted state as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Load persisted state from an exported JSON file
    Import { file: PathBuf },
    /// Delete all persisted state under the configured namespace
    Clear {
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { yes }) => match commands::run_init(yes) {
            Ok(()) => Ok(()),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Some(Commands::Doctor) => match commands::run_doctor() {
            Ok(()) => Ok(()),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Some(Commands::Export { output }) => run_export(output),
        Some(Commands::Import { file }) => run_import(&file),
        Some(Commands::Clear { yes }) => run_clear(yes),
        Some(Commands::Tui) | None => run_tui().await,
    }
}

/// Discover config relative to the working directory; absence means defaults.
fn load_config() -> LoadoutConfig {
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("Error: failed to get current directory: {}", e);
            std::process::exit(1);
        }
    };
    match LoadoutConfig::discover(&cwd) {
        Ok((path, config)) => {
            eprintln!("Loaded config from: {}", path.display());
            config
        }
        Err(ConfigError::NotFound { .. }) => LoadoutConfig::default(),
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    }
}

fn open_store(config: &LoadoutConfig) -> FileStore {
    match FileStore::open(&config.storage) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening store {}: {}", config.storage.display(), e);
            std::process::exit(1);
        }
    }
}

fn run_export(output: Option<PathBuf>) -> io::Result<()> {
    let config = load_config();
    let keys = KeySpace::new(&config.namespace);
    let store = open_store(&config);

    let doc = transfer::export(&store, &keys);
    let text = match serde_json::to_string_pretty(&doc) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match output {
        Some(path) => {
            std::fs::write(&path, text)?;
            println!("Exported {} key(s) to {}", doc.len(), path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn run_import(file: &PathBuf) -> io::Result<()> {
    let config = load_config();
    let keys = KeySpace::new(&config.namespace);
    let mut store = open_store(&config);

    let text = std::fs::read_to_string(file)?;
    match transfer::import(&mut store, &keys, &text) {
        Ok(written) => {
            if let Err(e) = BuildList::new(&keys).repair(&mut store) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
            println!(
                "Imported {} key(s) into {}",
                written,
                config.storage.display()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_clear(yes: bool) -> io::Result<()> {
    if !yes {
        eprintln!("This deletes all tracked state. Re-run with --yes to confirm.");
        std::process::exit(1);
    }

    let config = load_config();
    let keys = KeySpace::new(&config.namespace);
    let mut store = open_store(&config);

    match transfer::clear(&mut store, &keys) {
        Ok(removed) => {
            println!("Removed {} key(s)", removed);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

// --- Terminal setup/teardown ---
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_tui() -> io::Result<()> {
    let config = load_config();
    let keys = KeySpace::new(&config.namespace);

    // The catalog is fetched exactly once; failure is terminal for the
    // session.
    let source = FileSource::new(&config.catalog);
    let catalog = match catalog::fetch_catalog(&source, &config.menu_order).await {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error loading catalog {}: {}", config.catalog.display(), e);
            eprintln!("Run `loadout init` to create a sample catalog.");
            std::process::exit(1);
        }
    };

    let state = AppState::build(catalog, &config.title, &config.exclude_from_search);
    let mut store = open_store(&config);

    // Stored builds may lack ids (hand-edited imports); give them stable ids
    // before any edit is addressed by one.
    if let Err(e) = BuildList::new(&keys).repair(&mut store) {
        eprintln!("Error repairing build list: {}", e);
        std::process::exit(1);
    }

    let mut app = App::new(config, keys, state, store);
    app.refresh_rows();

    let mut terminal = setup_terminal()?;
    let res = tui_loop(&mut terminal, &mut app);
    restore_terminal(terminal)?;
    res
}

fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    let debounce = Duration::from_millis(app.config.search_debounce_ms);

    loop {
        // Debounced search: the query only reaches the row filter once typing
        // has been quiet for the configured window.
        if let Some(at) = app.pending_search {
            if at.elapsed() >= debounce {
                app.commit_search();
            }
        }

        terminal.draw(|f| draw(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if app.handle_key(key) {
                        return Ok(());
                    }
                }
            }
        }
    }
}

// --- App state ---

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SidebarEntry {
    SearchAll,
    Menu(usize),
    Todo,
    Wish,
    Builds,
    Storage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum Focus {
    #[default]
    Sidebar,
    Content,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum BuildField {
    Kind,
    Item,
    Name,
    Arcane(usize),
    Aura,
    Exilus,
    Mod(usize),
    Note,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum EditTarget {
    Cell { item_id: String, column_key: String },
    TodoNew,
    TodoText { id: String },
    WishNewItem,
    WishItem { id: String },
    WishQty { id: String },
    WishNote { id: String },
    BuildField { id: String, field: BuildField },
}

impl EditTarget {
    /// Targets holding an item display name get autocomplete suggestions.
    fn wants_suggestions(&self) -> bool {
        matches!(
            self,
            EditTarget::WishNewItem
                | EditTarget::WishItem { .. }
                | EditTarget::BuildField {
                    field: BuildField::Item,
                    ..
                }
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Mode {
    Normal,
    Search,
    Edit(EditTarget),
    ConfirmClear,
}

struct App {
    config: LoadoutConfig,
    keys: KeySpace,
    state: AppState,
    store: FileStore,

    todos: TodoList,
    wishes: WishList,
    builds: BuildList,

    sidebar: Vec<SidebarEntry>,
    sidebar_idx: usize,
    focus: Focus,

    filter: RowFilter,
    search_buffer: String,
    pending_search: Option<Instant>,
    rows: Vec<view::RenderRow>,
    selected_row: usize,
    selected_col: usize,

    selected_record: usize,
    open_build: Option<String>,
    build_field_idx: usize,

    mode: Mode,
    input: String,
    status: Option<String>,
}

impl App {
    fn new(config: LoadoutConfig, keys: KeySpace, state: AppState, store: FileStore) -> Self {
        let mut sidebar = vec![SidebarEntry::SearchAll];
        sidebar.extend((0..state.catalog.menus.len()).map(SidebarEntry::Menu));
        sidebar.extend([
            SidebarEntry::Builds,
            SidebarEntry::Todo,
            SidebarEntry::Wish,
            SidebarEntry::Storage,
        ]);

        let todos = TodoList::new(&keys);
        let wishes = WishList::new(&keys);
        let builds = BuildList::new(&keys);

        Self {
            config,
            keys,
            state,
            store,
            todos,
            wishes,
            builds,
            sidebar,
            sidebar_idx: 0,
            focus: Focus::Sidebar,
            filter: RowFilter::default(),
            search_buffer: String::new(),
            pending_search: None,
            rows: Vec::new(),
            selected_row: 0,
            selected_col: 0,
            selected_record: 0,
            open_build: None,
            build_field_idx: 0,
            mode: Mode::Normal,
            input: String::new(),
            status: None,
        }
    }

    fn entry(&self) -> SidebarEntry {
        self.sidebar[self.sidebar_idx]
    }

    fn entry_label(&self, entry: SidebarEntry) -> String {
        match entry {
            SidebarEntry::SearchAll => self.state.search_all.title.clone(),
            SidebarEntry::Menu(i) => self
                .state
                .catalog
                .menus
                .get(i)
                .map(|m| m.title.clone())
                .unwrap_or_default(),
            SidebarEntry::Todo => "TODO".to_string(),
            SidebarEntry::Wish => "Wish List".to_string(),
            SidebarEntry::Builds => "Builds".to_string(),
            SidebarEntry::Storage => "Storage".to_string(),
        }
    }

    fn current_menu(&self) -> Option<&Menu> {
        match self.entry() {
            SidebarEntry::SearchAll => Some(&self.state.search_all),
            SidebarEntry::Menu(i) => self.state.catalog.menus.get(i),
            _ => None,
        }
    }

    fn refresh_rows(&mut self) {
        let rows = match self.current_menu() {
            Some(menu) => view::visible_rows(menu, &self.filter, &self.keys, &self.store),
            None => Vec::new(),
        };
        self.rows = rows;
        if self.selected_row >= self.rows.len() {
            self.selected_row = self.rows.len().saturating_sub(1);
        }
    }

    fn commit_search(&mut self) {
        self.filter.query = self.search_buffer.clone();
        self.pending_search = None;
        self.refresh_rows();
    }

    fn report<E: std::fmt::Display>(&mut self, result: Result<(), E>) {
        if let Err(e) = result {
            self.status = Some(format!("Error: {}", e));
        }
    }

    fn open_build_record(&self) -> Option<BuildRecord> {
        let id = self.open_build.as_deref()?;
        self.builds
            .all(&self.store)
            .into_iter()
            .find(|b| b.id == id)
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        self.status = None;

        match self.mode.clone() {
            Mode::Search => self.handle_search_key(key),
            Mode::Edit(target) => self.handle_edit_key(key, target),
            Mode::ConfirmClear => self.handle_confirm_clear_key(key),
            Mode::Normal => return self.handle_normal_key(key),
        }
        false
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.search_buffer.clear();
                self.filter.query.clear();
                self.pending_search = None;
                self.mode = Mode::Normal;
                self.refresh_rows();
            }
            KeyCode::Enter => {
                self.commit_search();
                self.mode = Mode::Normal;
            }
            KeyCode::Backspace => {
                self.search_buffer.pop();
                self.pending_search = Some(Instant::now());
            }
            KeyCode::Char(c) => {
                self.search_buffer.push(c);
                self.pending_search = Some(Instant::now());
            }
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent, target: EditTarget) {
        match key.code {
            KeyCode::Esc => {
                self.input.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input);
                self.mode = Mode::Normal;
                self.apply_edit(target, text);
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => {
                self.input.push(c);
            }
            _ => {}
        }
    }

    fn apply_edit(&mut self, target: EditTarget, text: String) {
        let text = text.trim().to_string();
        match target {
            EditTarget::Cell {
                item_id,
                column_key,
            } => {
                let res = view::set_override(
                    &mut self.store,
                    &self.keys,
                    &item_id,
                    &column_key,
                    &Value::String(text),
                );
                self.report(res);
                self.refresh_rows();
            }
            EditTarget::TodoNew => {
                if !text.is_empty() {
                    let res = self.todos.add(&mut self.store, &text).map(|_| ());
                    self.report(res);
                }
            }
            EditTarget::TodoText { id } => {
                let res = self.todos.update(&mut self.store, &id, |t| t.text = text);
                self.report(res);
            }
            EditTarget::WishNewItem => {
                if !text.is_empty() {
                    let res = self.wishes.add(&mut self.store, &text, "1", "").map(|_| ());
                    self.report(res);
                }
            }
            EditTarget::WishItem { id } => {
                let res = self.wishes.update(&mut self.store, &id, |w| w.item = text);
                self.report(res);
            }
            EditTarget::WishQty { id } => {
                let res = self.wishes.update(&mut self.store, &id, |w| w.qty = text);
                self.report(res);
            }
            EditTarget::WishNote { id } => {
                let res = self.wishes.update(&mut self.store, &id, |w| w.note = text);
                self.report(res);
            }
            EditTarget::BuildField { id, field } => {
                let res = self.builds.update(&mut self.store, &id, |b| match field {
                    BuildField::Item => b.item = text,
                    BuildField::Name => b.name = text,
                    BuildField::Arcane(i) => {
                        if i < b.arcanes.len() {
                            b.arcanes[i] = text;
                        }
                    }
                    BuildField::Aura => b.aura = text,
                    BuildField::Exilus => b.exilus = text,
                    BuildField::Mod(i) => {
                        if i < b.mods.len() {
                            b.mods[i] = text;
                        }
                    }
                    BuildField::Note => b.note = text,
                    BuildField::Kind => {}
                });
                self.report(res);
            }
        }
    }

    fn handle_confirm_clear_key(&mut self, key: KeyEvent) {
        self.mode = Mode::Normal;
        if key.code == KeyCode::Char('y') {
            match transfer::clear(&mut self.store, &self.keys) {
                Ok(removed) => self.status = Some(format!("Removed {} key(s)", removed)),
                Err(e) => self.status = Some(format!("Error: {}", e)),
            }
            self.refresh_rows();
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Sidebar => Focus::Content,
                    Focus::Content => Focus::Sidebar,
                };
            }
            _ => match self.focus {
                Focus::Sidebar => self.handle_sidebar_key(key),
                Focus::Content => self.handle_content_key(key),
            },
        }
        false
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.sidebar_idx + 1 < self.sidebar.len() {
                    self.sidebar_idx += 1;
                    self.switch_screen();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if self.sidebar_idx > 0 {
                    self.sidebar_idx -= 1;
                    self.switch_screen();
                }
            }
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                self.focus = Focus::Content;
            }
            _ => {}
        }
    }

    fn switch_screen(&mut self) {
        self.selected_row = 0;
        self.selected_col = 0;
        self.selected_record = 0;
        self.open_build = None;
        self.build_field_idx = 0;
        self.refresh_rows();
    }

    fn handle_content_key(&mut self, key: KeyEvent) {
        match self.entry() {
            SidebarEntry::SearchAll | SidebarEntry::Menu(_) => self.handle_checklist_key(key),
            SidebarEntry::Todo => self.handle_todo_key(key),
            SidebarEntry::Wish => self.handle_wish_key(key),
            SidebarEntry::Builds => {
                if self.open_build.is_some() {
                    self.handle_build_editor_key(key);
                } else {
                    self.handle_build_list_key(key);
                }
            }
            SidebarEntry::Storage => self.handle_storage_key(key),
        }
    }

    fn handle_checklist_key(&mut self, key: KeyEvent) {
        let column_count = self.current_menu().map(|m| m.columns.len()).unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected_row + 1 < self.rows.len() {
                    self.selected_row += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.selected_col = self.selected_col.saturating_sub(1);
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if self.selected_col + 1 < column_count {
                    self.selected_col += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(row) = self.rows.get(self.selected_row) {
                    let id = row.item_id.clone();
                    let now = !row.checked;
                    let res = view::set_checked(&mut self.store, &self.keys, &id, now);
                    self.report(res);
                    self.refresh_rows();
                }
            }
            KeyCode::Enter => self.activate_cell(),
            KeyCode::Char('/') => {
                self.mode = Mode::Search;
            }
            KeyCode::Char('c') => {
                self.filter.show_checked = !self.filter.show_checked;
                self.refresh_rows();
            }
            KeyCode::Char('u') => {
                self.filter.show_unchecked = !self.filter.show_unchecked;
                self.refresh_rows();
            }
            KeyCode::Char('d') => {
                self.filter.show_details = !self.filter.show_details;
            }
            _ => {}
        }
    }

    /// Enter on a cell: cycle a select column, open an input column for
    /// editing. Text columns are static.
    fn activate_cell(&mut self) {
        let Some(menu) = self.current_menu() else {
            return;
        };
        let Some(column) = menu.columns.get(self.selected_col) else {
            return;
        };
        let Some(row) = self.rows.get(self.selected_row) else {
            return;
        };
        let item_id = row.item_id.clone();
        let column_key = column.key.clone();
        let kind = column.kind.clone();
        let current = row
            .cells
            .get(self.selected_col)
            .cloned()
            .unwrap_or_default();

        match kind {
            ColumnKind::Text => {}
            ColumnKind::Input => {
                self.input = current;
                self.mode = Mode::Edit(EditTarget::Cell {
                    item_id,
                    column_key,
                });
            }
            ColumnKind::Select { options } => {
                if options.is_empty() {
                    return;
                }
                let next = match options.iter().position(|o| *o == current) {
                    Some(i) => options[(i + 1) % options.len()].clone(),
                    None => options[0].clone(),
                };
                let res = view::set_override(
                    &mut self.store,
                    &self.keys,
                    &item_id,
                    &column_key,
                    &Value::String(next),
                );
                self.report(res);
                self.refresh_rows();
            }
        }
    }

    fn handle_todo_key(&mut self, key: KeyEvent) {
        let list = self.todos.all(&self.store);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected_record + 1 < list.len() {
                    self.selected_record += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_record = self.selected_record.saturating_sub(1);
            }
            KeyCode::Char('a') => {
                self.input.clear();
                self.mode = Mode::Edit(EditTarget::TodoNew);
            }
            KeyCode::Char(' ') => {
                if let Some(entry) = list.get(self.selected_record) {
                    let id = entry.id.clone();
                    let res = self.todos.toggle(&mut self.store, &id);
                    self.report(res);
                }
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(entry) = list.get(self.selected_record) {
                    self.input = entry.text.clone();
                    self.mode = Mode::Edit(EditTarget::TodoText {
                        id: entry.id.clone(),
                    });
                }
            }
            KeyCode::Char('x') => {
                if let Some(entry) = list.get(self.selected_record) {
                    let id = entry.id.clone();
                    let res = self.todos.remove(&mut self.store, &id);
                    self.report(res);
                    self.selected_record = self.selected_record.saturating_sub(1);
                }
            }
            _ => {}
        }
    }

    fn handle_wish_key(&mut self, key: KeyEvent) {
        let list = self.wishes.all(&self.store);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected_record + 1 < list.len() {
                    self.selected_record += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_record = self.selected_record.saturating_sub(1);
            }
            KeyCode::Char('a') => {
                self.input.clear();
                self.mode = Mode::Edit(EditTarget::WishNewItem);
            }
            KeyCode::Char(' ') => {
                if let Some(entry) = list.get(self.selected_record) {
                    let id = entry.id.clone();
                    let res = self.wishes.toggle(&mut self.store, &id);
                    self.report(res);
                }
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(entry) = list.get(self.selected_record) {
                    self.input = entry.item.clone();
                    self.mode = Mode::Edit(EditTarget::WishItem {
                        id: entry.id.clone(),
                    });
                }
            }
            KeyCode::Char('y') => {
                if let Some(entry) = list.get(self.selected_record) {
                    self.input = entry.qty.clone();
                    self.mode = Mode::Edit(EditTarget::WishQty {
                        id: entry.id.clone(),
                    });
                }
            }
            KeyCode::Char('n') => {
                if let Some(entry) = list.get(self.selected_record) {
                    self.input = entry.note.clone();
                    self.mode = Mode::Edit(EditTarget::WishNote {
                        id: entry.id.clone(),
                    });
                }
            }
            KeyCode::Char('x') => {
                if let Some(entry) = list.get(self.selected_record) {
                    let id = entry.id.clone();
                    let res = self.wishes.remove(&mut self.store, &id);
                    self.report(res);
                    self.selected_record = self.selected_record.saturating_sub(1);
                }
            }
            _ => {}
        }
    }

    fn handle_build_list_key(&mut self, key: KeyEvent) {
        let list = self.builds.all(&self.store);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected_record + 1 < list.len() {
                    self.selected_record += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_record = self.selected_record.saturating_sub(1);
            }
            KeyCode::Char('a') => match self.builds.add(&mut self.store) {
                Ok(build) => {
                    self.open_build = Some(build.id);
                    self.build_field_idx = 0;
                }
                Err(e) => self.status = Some(format!("Error: {}", e)),
            },
            KeyCode::Enter => {
                if let Some(build) = list.get(self.selected_record) {
                    self.open_build = Some(build.id.clone());
                    self.build_field_idx = 0;
                }
            }
            KeyCode::Char('x') => {
                if let Some(build) = list.get(self.selected_record) {
                    let id = build.id.clone();
                    let res = self.builds.remove(&mut self.store, &id);
                    self.report(res);
                    self.selected_record = self.selected_record.saturating_sub(1);
                }
            }
            _ => {}
        }
    }

    fn handle_build_editor_key(&mut self, key: KeyEvent) {
        let Some(build) = self.open_build_record() else {
            self.open_build = None;
            return;
        };
        let fields = build_fields(&build);

        match key.code {
            KeyCode::Esc => {
                self.open_build = None;
                self.build_field_idx = 0;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.build_field_idx + 1 < fields.len() {
                    self.build_field_idx += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.build_field_idx = self.build_field_idx.saturating_sub(1);
            }
            KeyCode::Char(' ') => {
                let Some((_, value, field)) = fields.get(self.build_field_idx) else {
                    return;
                };
                if value.is_empty()
                    || matches!(field, BuildField::Kind | BuildField::Name | BuildField::Note)
                {
                    return;
                }
                let res = toggle_slot_checked(&mut self.store, &self.keys, value).map(|_| ());
                self.report(res);
            }
            KeyCode::Enter => {
                let Some((_, value, field)) = fields.get(self.build_field_idx) else {
                    return;
                };
                if *field == BuildField::Kind {
                    // Category cycles in place; the slot arrays resize on
                    // update.
                    let next = BUILD_KINDS
                        .iter()
                        .position(|k| *k == build.kind)
                        .map(|i| BUILD_KINDS[(i + 1) % BUILD_KINDS.len()])
                        .unwrap_or(BUILD_KINDS[0]);
                    let id = build.id.clone();
                    let res = self
                        .builds
                        .update(&mut self.store, &id, |b| b.kind = next.to_string());
                    self.report(res);
                    self.clamp_build_field();
                } else {
                    self.input = value.clone();
                    self.mode = Mode::Edit(EditTarget::BuildField {
                        id: build.id.clone(),
                        field: field.clone(),
                    });
                }
            }
            _ => {}
        }
    }

    fn clamp_build_field(&mut self) {
        if let Some(build) = self.open_build_record() {
            let len = build_fields(&build).len();
            if self.build_field_idx >= len {
                self.build_field_idx = len.saturating_sub(1);
            }
        }
    }

    fn handle_storage_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('e') => {
                let doc = transfer::export(&self.store, &self.keys);
                let path = PathBuf::from("loadout_export.json");
                match serde_json::to_string_pretty(&doc) {
                    Ok(text) => match std::fs::write(&path, text) {
                        Ok(()) => {
                            self.status = Some(format!(
                                "Exported {} key(s) to {}",
                                doc.len(),
                                path.display()
                            ));
                        }
                        Err(e) => self.status = Some(format!("Error: {}", e)),
                    },
                    Err(e) => self.status = Some(format!("Error: {}", e)),
                }
            }
            KeyCode::Char('c') => {
                self.mode = Mode::ConfirmClear;
            }
            _ => {}
        }
    }
}

/// Toggle the availability mark for a build slot entry, keyed by the
/// display-name slug. Returns the new state.
fn toggle_slot_checked(
    store: &mut dyn KeyValueStore,
    keys: &KeySpace,
    value: &str,
) -> Result<bool, StoreError> {
    let id = slug(value);
    let now = !view::checked(store, keys, &id);
    view::set_checked(store, keys, &id, now)?;
    Ok(now)
}

/// Editable fields of a build, in display order. Melee shows the shared
/// aura/stance storage field under its stance label.
fn build_fields(build: &BuildRecord) -> Vec<(String, String, BuildField)> {
    let slots = build.slots();
    let mut fields = vec![
        ("Type".to_string(), build.kind.clone(), BuildField::Kind),
        ("Item".to_string(), build.item.clone(), BuildField::Item),
        ("Name".to_string(), build.name.clone(), BuildField::Name),
    ];
    for (i, arcane) in build.arcanes.iter().enumerate().take(slots.arcanes) {
        fields.push((
            format!("Arcane {}", i + 1),
            arcane.clone(),
            BuildField::Arcane(i),
        ));
    }
    if slots.aura {
        fields.push(("Aura".to_string(), build.aura.clone(), BuildField::Aura));
    }
    if slots.stance {
        fields.push(("Stance".to_string(), build.aura.clone(), BuildField::Aura));
    }
    if slots.exilus {
        fields.push((
            "Exilus".to_string(),
            build.exilus.clone(),
            BuildField::Exilus,
        ));
    }
    for (i, m) in build.mods.iter().enumerate() {
        fields.push((format!("Mod {}", i + 1), m.clone(), BuildField::Mod(i)));
    }
    fields.push(("Note".to_string(), build.note.clone(), BuildField::Note));
    fields
}

/// Remove `<...>` markup runs from catalog description text.
fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    for c in s.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Truncate-and-pad to a fixed character width.
fn pad(s: &str, width: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > width {
        let mut out: String = chars.into_iter().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    } else {
        let pad_len = width - chars.len();
        let mut out = s.to_string();
        out.extend(std::iter::repeat(' ').take(pad_len));
        out
    }
}

// --- Drawing ---

const NAME_COL_WIDTH: usize = 30;
const CELL_COL_WIDTH: usize = 16;

fn draw(f: &mut ratatui::Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(1)])
        .split(outer[0]);

    draw_sidebar(f, app, main[0]);

    match app.entry() {
        SidebarEntry::SearchAll | SidebarEntry::Menu(_) => draw_checklist(f, app, main[1]),
        SidebarEntry::Todo => draw_todo(f, app, main[1]),
        SidebarEntry::Wish => draw_wish(f, app, main[1]),
        SidebarEntry::Builds => {
            if app.open_build.is_some() {
                draw_build_editor(f, app, main[1]);
            } else {
                draw_build_list(f, app, main[1]);
            }
        }
        SidebarEntry::Storage => draw_storage(f, app, main[1]),
    }

    draw_footer(f, app, outer[1]);
}

fn draw_sidebar(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .sidebar
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let label = app.entry_label(*entry);
            let style = if i == app.sidebar_idx {
                styles::selection()
            } else {
                styles::text()
            };
            ListItem::new(Line::from(Span::styled(format!(" {}", label), style)))
        })
        .collect();

    let border = if app.focus == Focus::Sidebar {
        styles::border_focused()
    } else {
        styles::border_subtle()
    };
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled("Menus", styles::title())),
    );
    f.render_widget(list, area);
}

fn draw_checklist(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let constraints = if app.filter.show_details {
        vec![
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
        ]
    } else {
        vec![Constraint::Length(3), Constraint::Min(1)]
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    // Search bar
    let query = if app.mode == Mode::Search {
        format!("{}▏", app.search_buffer)
    } else {
        app.search_buffer.clone()
    };
    let search = Paragraph::new(Line::from(vec![
        Span::styled("Search: ", styles::text_dim()),
        Span::styled(query, styles::text()),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(if app.mode == Mode::Search {
                styles::border_focused()
            } else {
                styles::border_subtle()
            }),
    );
    f.render_widget(search, chunks[0]);

    let Some(menu) = app.current_menu() else {
        return;
    };

    // Header line with the selected column highlighted
    let mut header_spans = vec![Span::styled(pad("", 4), styles::text_dim())];
    if menu.columns.is_empty() {
        header_spans.push(Span::styled(
            pad("Name", NAME_COL_WIDTH),
            styles::section_header(),
        ));
    }
    for (i, column) in menu.columns.iter().enumerate() {
        let width = if i == 0 { NAME_COL_WIDTH } else { CELL_COL_WIDTH };
        let style = if i == app.selected_col && app.focus == Focus::Content {
            styles::accent()
        } else {
            styles::section_header()
        };
        header_spans.push(Span::styled(pad(&column.label, width), style));
    }

    let mut lines = vec![Line::from(header_spans)];
    for (i, row) in app.rows.iter().enumerate() {
        let selected = i == app.selected_row && app.focus == Focus::Content;
        let base = if selected {
            styles::selection()
        } else {
            styles::checked(row.checked)
        };

        let mut spans = vec![Span::styled(
            format!("{} ", styles::check_icon(row.checked)),
            if row.checked {
                styles::success()
            } else {
                styles::text_dim()
            },
        )];
        if menu.columns.is_empty() {
            spans.push(Span::styled(pad(&row.name, NAME_COL_WIDTH), base));
        }
        for (c, cell) in row.cells.iter().enumerate() {
            let width = if c == 0 { NAME_COL_WIDTH } else { CELL_COL_WIDTH };
            spans.push(Span::styled(pad(cell, width), base));
        }
        lines.push(Line::from(spans));
    }

    let title = format!("{} ({})", menu.title, app.rows.len());
    let table = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(if app.focus == Focus::Content {
                styles::border_focused()
            } else {
                styles::border_subtle()
            })
            .title(Span::styled(title, styles::title())),
    );
    f.render_widget(table, chunks[1]);

    if app.filter.show_details {
        draw_details(f, app, chunks[2]);
    }
}

fn draw_details(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    if let Some(row) = app.rows.get(app.selected_row) {
        let mut title_spans = vec![Span::styled(row.name.clone(), styles::title())];
        if let Some(rarity) = &row.rarity {
            title_spans.push(Span::raw("  "));
            title_spans.push(Span::styled(rarity.label(), styles::rarity(rarity)));
        }
        lines.push(Line::from(title_spans));
        if let Some(desc) = &row.desc {
            lines.push(Line::from(Span::styled(
                strip_tags(desc),
                styles::text_dim(),
            )));
        }
    }
    let details = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_subtle())
            .title(Span::styled("Details", styles::title())),
    );
    f.render_widget(details, area);
}

fn draw_todo(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let list = app.todos.all(&app.store);
    let items: Vec<ListItem> = list
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let selected = i == app.selected_record && app.focus == Focus::Content;
            let style = if selected {
                styles::selection()
            } else {
                styles::checked(entry.checked)
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} ", styles::check_icon(entry.checked)),
                    styles::text_dim(),
                ),
                Span::styled(entry.text.clone(), style),
            ]))
        })
        .collect();

    let title = format!("TODO ({})", list.len());
    let widget = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(content_border(app))
            .title(Span::styled(title, styles::title())),
    );
    f.render_widget(widget, area);
}

fn draw_wish(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let list = app.wishes.all(&app.store);

    let header = Line::from(vec![
        Span::styled(pad("", 4), styles::text_dim()),
        Span::styled(pad("Item", NAME_COL_WIDTH), styles::section_header()),
        Span::styled(pad("Qty", 6), styles::section_header()),
        Span::styled("Note", styles::section_header()),
    ]);

    let mut lines = vec![header];
    for (i, entry) in list.iter().enumerate() {
        let selected = i == app.selected_record && app.focus == Focus::Content;
        let style = if selected {
            styles::selection()
        } else {
            styles::checked(entry.checked)
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ", styles::check_icon(entry.checked)),
                styles::text_dim(),
            ),
            Span::styled(pad(&entry.item, NAME_COL_WIDTH), style),
            Span::styled(pad(&entry.qty, 6), style),
            Span::styled(entry.note.clone(), style),
        ]));
    }

    let title = format!("Wish List ({})", list.len());
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(content_border(app))
            .title(Span::styled(title, styles::title())),
    );
    f.render_widget(widget, area);
}

fn draw_build_list(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let list = app.builds.all(&app.store);
    let items: Vec<ListItem> = list
        .iter()
        .enumerate()
        .map(|(i, build)| {
            let selected = i == app.selected_record && app.focus == Focus::Content;
            let style = if selected {
                styles::selection()
            } else {
                styles::text()
            };
            ListItem::new(Line::from(Span::styled(build.heading(), style)))
        })
        .collect();

    let title = format!("Builds ({})", list.len());
    let widget = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(content_border(app))
            .title(Span::styled(title, styles::title())),
    );
    f.render_widget(widget, area);
}

fn draw_build_editor(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let Some(build) = app.open_build_record() else {
        return;
    };
    let fields = build_fields(&build);

    let mut lines = Vec::with_capacity(fields.len() + 2);
    for (i, (label, value, _)) in fields.iter().enumerate() {
        let selected = i == app.build_field_idx;
        let value_style = if selected {
            styles::selection()
        } else {
            styles::text()
        };

        // Slot entries that match a checked item get a marker, linking builds
        // back to the checklists.
        let owned = !value.is_empty() && view::checked(&app.store, &app.keys, &slug(value));
        let marker = if owned { " ✓" } else { "" };

        lines.push(Line::from(vec![
            Span::styled(pad(label, 12), styles::text_dim()),
            Span::styled(value.clone(), value_style),
            Span::styled(marker, styles::success()),
        ]));
    }

    // Item lookup: show the catalog description for the referenced item.
    if let Some(item) = app.state.find_by_display(&build.item) {
        if let Some(desc) = &item.desc {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                strip_tags(desc),
                styles::text_muted(),
            )));
        }
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(content_border(app))
            .title(Span::styled(build.heading(), styles::title())),
    );
    f.render_widget(widget, area);
}

fn draw_storage(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let owned = transfer::export(&app.store, &app.keys).len();
    let lines = vec![
        Line::from(vec![
            Span::styled(pad("Store file", 14), styles::text_dim()),
            Span::styled(app.store.path().display().to_string(), styles::text()),
        ]),
        Line::from(vec![
            Span::styled(pad("Namespace", 14), styles::text_dim()),
            Span::styled(app.keys.namespace().to_string(), styles::text()),
        ]),
        Line::from(vec![
            Span::styled(pad("Keys", 14), styles::text_dim()),
            Span::styled(owned.to_string(), styles::text()),
        ]),
        Line::default(),
        Line::from(Span::styled(
            "e: export to loadout_export.json   c: clear all data",
            styles::key_hint(),
        )),
        Line::from(Span::styled(
            "Import via `loadout import <file>` from the shell",
            styles::text_muted(),
        )),
    ];

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(content_border(app))
            .title(Span::styled("Storage", styles::title())),
    );
    f.render_widget(widget, area);
}

fn content_border(app: &App) -> ratatui::style::Style {
    if app.focus == Focus::Content {
        styles::border_focused()
    } else {
        styles::border_subtle()
    }
}

fn draw_footer(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let line = match &app.mode {
        Mode::Search => Line::from(Span::styled(
            "typing filters rows (debounced)   Enter: apply   Esc: clear",
            styles::key_hint(),
        )),
        Mode::Edit(target) => {
            let mut spans = vec![
                Span::styled("Edit: ", styles::text_dim()),
                Span::styled(format!("{}▏", app.input), styles::text()),
            ];
            if target.wants_suggestions() {
                let needle = app.input.trim().to_lowercase();
                if !needle.is_empty() {
                    let matches: Vec<&str> = app
                        .state
                        .suggestions()
                        .into_iter()
                        .filter(|s| s.to_lowercase().contains(&needle))
                        .take(4)
                        .collect();
                    if !matches.is_empty() {
                        spans.push(Span::styled(
                            format!("   ({})", matches.join(" | ")),
                            styles::text_muted(),
                        ));
                    }
                }
            }
            Line::from(spans)
        }
        Mode::ConfirmClear => Line::from(Span::styled(
            "Delete ALL tracked data? y: confirm   any other key: cancel",
            styles::error(),
        )),
        Mode::Normal => {
            if let Some(status) = &app.status {
                Line::from(Span::styled(status.clone(), styles::warn()))
            } else {
                let hints = match app.entry() {
                    SidebarEntry::SearchAll | SidebarEntry::Menu(_) => {
                        "space: check  enter: edit cell  /: search  c/u: filter  d: details  q: quit"
                    }
                    SidebarEntry::Todo => "a: add  space: check  e: edit  x: delete  q: quit",
                    SidebarEntry::Wish => {
                        "a: add  space: check  e: item  y: qty  n: note  x: delete  q: quit"
                    }
                    SidebarEntry::Builds => {
                        if app.open_build.is_some() {
                            "enter: edit field (Type cycles)  space: toggle owned  esc: back  q: quit"
                        } else {
                            "a: new build  enter: open  x: delete  q: quit"
                        }
                    }
                    SidebarEntry::Storage => "e: export  c: clear  q: quit",
                };
                Line::from(Span::styled(hints, styles::key_hint()))
            }
        }
    };
    f.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<DT_FIRE>Heat damage"), "Heat damage");
        assert_eq!(strip_tags("plain"), "plain");
        assert_eq!(strip_tags("a<b><c>d"), "ad");
    }

    #[test]
    fn test_pad_truncates_with_ellipsis() {
        assert_eq!(pad("abc", 5), "abc  ");
        assert_eq!(pad("abcdef", 4), "abc…");
        assert_eq!(pad("", 3), "   ");
    }

    #[test]
    fn test_toggle_slot_checked_writes_slug_key() {
        let keys = KeySpace::default();
        let mut store = loadout_core::store::MemoryStore::new();

        assert!(toggle_slot_checked(&mut store, &keys, "Primed Flow").unwrap());
        assert!(view::checked(&store, &keys, "Primed_Flow"));

        assert!(!toggle_slot_checked(&mut store, &keys, "Primed Flow").unwrap());
        assert!(!view::checked(&store, &keys, "Primed_Flow"));
    }

    #[test]
    fn test_sidebar_record_screen_order() {
        let config = LoadoutConfig::default();
        let keys = KeySpace::default();
        let state = AppState::build(loadout_core::model::Catalog::default(), "Item Tracker", &[]);
        let path = std::env::temp_dir().join(format!("loadout-sidebar-{}.json", std::process::id()));
        let store = FileStore::open(path).unwrap();

        let app = App::new(config, keys, state, store);
        assert_eq!(
            app.sidebar,
            vec![
                SidebarEntry::SearchAll,
                SidebarEntry::Builds,
                SidebarEntry::Todo,
                SidebarEntry::Wish,
                SidebarEntry::Storage,
            ]
        );
    }

    #[test]
    fn test_build_fields_follow_slot_config() {
        let keys = KeySpace::default();
        let builds = BuildList::new(&keys);
        let mut store = loadout_core::store::MemoryStore::new();
        let build = builds.add(&mut store).unwrap();

        // Warframe: type/item/name + 2 arcanes + aura + exilus + 8 mods + note
        let fields = build_fields(&build);
        assert_eq!(fields.len(), 3 + 2 + 1 + 1 + 8 + 1);
        assert!(fields.iter().any(|(label, _, _)| label == "Aura"));
        assert!(!fields.iter().any(|(label, _, _)| label == "Stance"));

        builds
            .update(&mut store, &build.id, |b| b.kind = "近接".into())
            .unwrap();
        let melee = builds
            .all(&store)
            .into_iter()
            .find(|b| b.id == build.id)
            .unwrap();
        let fields = build_fields(&melee);
        assert_eq!(fields.len(), 3 + 1 + 1 + 8 + 1);
        assert!(fields.iter().any(|(label, _, _)| label == "Stance"));
    }
}
