use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use iced::task::Handle as AbortHandle;
use iced::widget::image::Handle as ImageHandle;
use iced::widget::{
    button, column, container, horizontal_space, image, mouse_area, row, scrollable, text, Column,
    Row,
};
use iced::{Alignment, Border, Color, Element, Length, Subscription, Task, Theme};

// Declare the application modules
mod fetch;
mod gallery;
mod wallpaper;

use fetch::FetchError;
use gallery::data::{GridItem, PhotoRef, SlotId, ThumbState};
use gallery::selection::{SelectionSet, ToggleOutcome, MAX_SELECTED};
use gallery::state::Gallery;
use wallpaper::GenerateError;

/// Columns shown in the thumbnail grid
const GRID_COLUMNS: usize = 3;

/// Gap between grid cells
const GRID_SPACING: f32 = 8.0;

/// On-screen edge of one grid cell, matching the decoded thumbnail size
const THUMB_CELL: f32 = fetch::thumbnail::THUMBNAIL_SIZE as f32;

/// How often an armed wallpaper refresh re-generates
const REFRESH_INTERVAL: Duration = Duration::from_secs(3600);

/// How long informational notices stay on screen
const NOTICE_SHORT: Duration = Duration::from_secs(2);

/// How long warning and error notices stay on screen
const NOTICE_LONG: Duration = Duration::from_secs(3);

/// Why a listing request was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListingIntent {
    /// Replace the grid with a fresh page once it arrives
    Replace { page: u32 },
    /// Append the next page under the current grid
    Append,
}

/// The most recent listing request; responses to older ones are stale
#[derive(Debug, Clone, Copy)]
struct PendingListing {
    id: u64,
    intent: ListingIntent,
}

/// Main application state
struct Picwall {
    /// Shared HTTP client for every fetch
    http: reqwest::Client,
    /// The photo grid and its page position
    gallery: Gallery,
    /// Picks and rejects, kept across batch replacements
    selection: SelectionSet,
    /// Abort handles of in-flight thumbnail fetchers, keyed by slot
    fetchers: HashMap<SlotId, AbortHandle>,
    /// Outstanding listing request, if any
    pending_listing: Option<PendingListing>,
    /// Source of listing request ids
    listing_counter: u64,
    /// A generation cycle is in flight (cycles are serialized)
    generating: bool,
    /// The hourly refresh arms itself on the first generation
    refresh_armed: bool,
    /// Transient notice line, if one is showing
    notice: Option<String>,
    /// Dismissal generation for the notice line
    notice_counter: u64,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "New batch"
    NewBatch,
    /// The grid scrolled; reaching the bottom loads another page
    GridScrolled(scrollable::Viewport),
    /// A listing request finished
    ListingLoaded(u64, Result<Vec<PhotoRef>, FetchError>),
    /// A thumbnail fetcher delivered for its slot
    ThumbnailLoaded(SlotId, Result<ImageHandle, FetchError>),
    /// User clicked a thumbnail
    ToggleSelection(SlotId),
    /// User right-clicked a thumbnail
    ExcludePhoto(SlotId),
    /// User clicked "Generate wallpaper"
    GenerateWallpaper,
    /// A generation cycle finished
    WallpaperGenerated(Result<PathBuf, GenerateError>),
    /// The hourly refresh fired
    RefreshTick,
    /// A notice's display time ran out
    NoticeExpired(u64),
}

impl Picwall {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let http = reqwest::Client::builder()
            .user_agent("picwall/0.1")
            .build()
            .unwrap_or_default();

        let mut app = Picwall {
            http,
            gallery: Gallery::new(),
            selection: SelectionSet::new(),
            fetchers: HashMap::new(),
            pending_listing: None,
            listing_counter: 0,
            generating: false,
            refresh_armed: false,
            notice: None,
            notice_counter: 0,
        };

        println!("🎨 Picwall initialized, fetching the first batch");

        // Populate the grid right away instead of opening empty
        let page = fetch::listing::random_page();
        let task = app.start_listing(page, ListingIntent::Replace { page });

        (app, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::NewBatch => {
                let page = fetch::listing::random_page();
                self.start_listing(page, ListingIntent::Replace { page })
            }
            Message::GridScrolled(viewport) => {
                let at_bottom = viewport.relative_offset().y >= 1.0;

                if at_bottom && self.pending_listing.is_none() && !self.gallery.is_empty() {
                    let page = self.gallery.advance_page();
                    return self.start_listing(page, ListingIntent::Append);
                }

                Task::none()
            }
            Message::ListingLoaded(id, result) => {
                let Some(pending) = self.pending_listing else {
                    return Task::none();
                };
                if pending.id != id {
                    // A newer request superseded this one
                    return Task::none();
                }
                self.pending_listing = None;

                match result {
                    Ok(photos) => {
                        let spawned = match pending.intent {
                            ListingIntent::Replace { page } => {
                                // The old batch only goes away once its
                                // successor has actually arrived
                                self.stop_fetchers();
                                self.gallery.replace_batch(page, photos)
                            }
                            ListingIntent::Append => self.gallery.append_batch(photos),
                        };

                        self.spawn_thumbnail_fetchers(spawned)
                    }
                    Err(err) => {
                        eprintln!("❌ Listing fetch failed: {}", err);
                        self.show_error(format!("Could not load photos: {}", err))
                    }
                }
            }
            Message::ThumbnailLoaded(slot, result) => {
                self.fetchers.remove(&slot);

                match result {
                    Ok(handle) => {
                        if !self.gallery.thumbnail_ready(slot, handle) {
                            println!("⏳ Discarded a late thumbnail for a retired slot");
                        }
                    }
                    Err(err) => {
                        // The placeholder stays; no notice for one bad cell
                        eprintln!("⚠️  Thumbnail failed: {}", err);
                        self.gallery.thumbnail_failed(slot);
                    }
                }

                Task::none()
            }
            Message::ToggleSelection(slot) => {
                let Some(photo) = self.gallery.photo(slot).cloned() else {
                    return Task::none();
                };

                match self.selection.toggle(&photo) {
                    ToggleOutcome::Selected | ToggleOutcome::Deselected => Task::none(),
                    ToggleOutcome::AtCapacity => {
                        self.show_notice(format!("You can pick at most {} photos", MAX_SELECTED))
                    }
                    ToggleOutcome::Excluded => Task::none(),
                }
            }
            Message::ExcludePhoto(slot) => {
                let Some(photo) = self.gallery.photo(slot).cloned() else {
                    return Task::none();
                };

                self.selection.exclude(&photo);
                println!("🚫 Excluded {}", photo.url());
                self.show_notice("Photo excluded from future picks")
            }
            Message::GenerateWallpaper => {
                if self.generating {
                    return self.show_error("A wallpaper is already being generated");
                }
                if self.selection.is_empty() {
                    // The button is disabled in this state anyway
                    return Task::none();
                }

                self.generating = true;
                self.refresh_armed = true;

                let photos = self.selection.photos().to_vec();
                println!("🎨 Generating wallpaper from {} photos", photos.len());

                let generate = Task::perform(
                    wallpaper::generate(self.http.clone(), photos),
                    Message::WallpaperGenerated,
                );
                let notice = self.show_notice("Generating wallpaper...");

                Task::batch([notice, generate])
            }
            Message::WallpaperGenerated(result) => {
                self.generating = false;

                match result {
                    Ok(path) => {
                        println!("✅ Wallpaper applied: {}", path.display());
                        self.show_notice("Wallpaper updated")
                    }
                    Err(err) => {
                        eprintln!("❌ Wallpaper generation failed: {}", err);
                        self.show_error(format!("Wallpaper failed: {}", err))
                    }
                }
            }
            Message::RefreshTick => {
                if self.generating {
                    println!("⏳ Refresh tick skipped, a cycle is already running");
                    return Task::none();
                }
                if self.selection.is_empty() {
                    return Task::none();
                }

                println!("🔄 Hourly wallpaper refresh");
                self.update(Message::GenerateWallpaper)
            }
            Message::NoticeExpired(id) => {
                // Only the newest notice owns the dismissal clock
                if id == self.notice_counter {
                    self.notice = None;
                }
                Task::none()
            }
        }
    }

    /// Kick off a listing request and remember it as the pending one
    fn start_listing(&mut self, page: u32, intent: ListingIntent) -> Task<Message> {
        self.listing_counter += 1;
        let id = self.listing_counter;
        self.pending_listing = Some(PendingListing { id, intent });

        println!("🔍 Requesting listing page {}", page);

        Task::perform(
            fetch::listing::fetch_listing(self.http.clone(), page),
            move |result| Message::ListingLoaded(id, result),
        )
    }

    /// Start one cancellable fetcher per new grid slot
    fn spawn_thumbnail_fetchers(&mut self, spawned: Vec<(SlotId, PhotoRef)>) -> Task<Message> {
        let mut tasks = Vec::with_capacity(spawned.len());

        for (slot, photo) in spawned {
            let (task, handle) = Task::perform(
                fetch::thumbnail::fetch_thumbnail(self.http.clone(), photo.url().to_string()),
                move |result| Message::ThumbnailLoaded(slot, result),
            )
            .abortable();

            self.fetchers.insert(slot, handle);
            tasks.push(task);
        }

        Task::batch(tasks)
    }

    /// Abort every in-flight thumbnail fetcher and retire its handle
    fn stop_fetchers(&mut self) {
        for (_, handle) in self.fetchers.drain() {
            handle.abort();
        }
    }

    /// Show a short-lived informational notice
    fn show_notice(&mut self, message: impl Into<String>) -> Task<Message> {
        self.push_notice(message.into(), NOTICE_SHORT)
    }

    /// Show a longer-lived warning or error notice
    fn show_error(&mut self, message: impl Into<String>) -> Task<Message> {
        self.push_notice(message.into(), NOTICE_LONG)
    }

    fn push_notice(&mut self, message: String, lifetime: Duration) -> Task<Message> {
        self.notice_counter += 1;
        let id = self.notice_counter;
        self.notice = Some(message);

        // The timer must be created inside the future: tokio panics if a
        // Sleep is built while no runtime is entered
        Task::perform(async move { tokio::time::sleep(lifetime).await }, move |_| {
            Message::NoticeExpired(id)
        })
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let grid = scrollable(self.view_grid())
            .width(Length::Fill)
            .height(Length::Fill)
            .on_scroll(Message::GridScrolled);

        let mut content = column![grid].spacing(12).padding(16);

        if let Some(notice) = &self.notice {
            content = content.push(
                container(text(notice).size(14))
                    .padding([6, 10])
                    .style(container::bordered_box),
            );
        }

        content = content.push(self.view_controls());

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// The thumbnail grid, three cells per row
    fn view_grid(&self) -> Element<Message> {
        let mut rows = Column::new().spacing(GRID_SPACING);

        for chunk in self.gallery.items().chunks(GRID_COLUMNS) {
            let mut grid_row = Row::new().spacing(GRID_SPACING);
            for item in chunk {
                grid_row = grid_row.push(self.view_cell(item));
            }
            rows = rows.push(grid_row);
        }

        rows.into()
    }

    /// One grid cell: thumbnail or placeholder, framed by selection state
    fn view_cell(&self, item: &GridItem) -> Element<Message> {
        let selected = self.selection.is_selected(&item.photo);
        let excluded = self.selection.is_excluded(&item.photo);

        let content: Element<Message> = match &item.thumb {
            ThumbState::Ready(handle) => {
                let thumb = image(handle.clone()).width(THUMB_CELL).height(THUMB_CELL);
                if excluded {
                    thumb.opacity(0.3).into()
                } else {
                    thumb.into()
                }
            }
            ThumbState::Loading | ThumbState::Failed => container(text("Loading...").size(14))
                .center_x(THUMB_CELL)
                .center_y(THUMB_CELL)
                .into(),
        };

        let framed = container(content)
            .padding(2)
            .style(move |_: &Theme| cell_style(selected));

        mouse_area(framed)
            .on_press(Message::ToggleSelection(item.slot))
            .on_right_press(Message::ExcludePhoto(item.slot))
            .into()
    }

    /// Bottom bar: the two actions plus a running count
    fn view_controls(&self) -> Element<Message> {
        let refresh = button("New batch").on_press(Message::NewBatch).padding(10);

        let generate = button("Generate wallpaper")
            .on_press_maybe(
                (!self.selection.is_empty()).then_some(Message::GenerateWallpaper),
            )
            .padding(10);

        let status = text(format!(
            "{} photos, {} of {} selected",
            self.gallery.items().len(),
            self.selection.len(),
            MAX_SELECTED
        ))
        .size(14)
        .color(Color::from_rgb8(0xa0, 0xa0, 0xa0));

        row![refresh, generate, horizontal_space(), status]
            .spacing(12)
            .align_y(Alignment::Center)
            .into()
    }

    /// The hourly refresh timer; runs only once armed by a generation
    fn subscription(&self) -> Subscription<Message> {
        if self.refresh_armed {
            iced::time::every(REFRESH_INTERVAL).map(|_| Message::RefreshTick)
        } else {
            Subscription::none()
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Border treatment for grid cells: green when selected, gray otherwise
fn cell_style(selected: bool) -> container::Style {
    let border = if selected {
        Border {
            color: Color::from_rgb8(0x4c, 0xaf, 0x50),
            width: 3.0,
            radius: 4.0.into(),
        }
    } else {
        Border {
            color: Color::from_rgb8(0xbd, 0xbd, 0xbd),
            width: 2.0,
            radius: 4.0.into(),
        }
    };

    container::Style {
        border,
        ..container::Style::default()
    }
}

fn main() -> iced::Result {
    iced::application(
        "Picwall",
        Picwall::update,
        Picwall::view,
    )
    .subscription(Picwall::subscription)
    .theme(Picwall::theme)
    .window_size((680.0, 820.0))
    .centered()
    .run_with(Picwall::new)
}
