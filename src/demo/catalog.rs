//! Paginated catalog: media types → items of one type
//!
//! Both views keep their cursor in a page controller on the view's page
//! stack (`types` below, `media` on top). Paging routes are meta. Leaving
//! the item list goes back with `removePage`, which discards the `media`
//! controller and lands on the type list at the page it was left on.

use async_trait::async_trait;
use std::fmt::Write as _;

use crate::routing::{CallbackContext, Component, Dispatcher, PageController, Route, ViewKey};
use crate::transport::{Button, Keyboard, MessageRef, Target};

pub const TYPES: &str = "types";
pub const MEDIA: &str = "media";

const TYPES_PAGE_SIZE: usize = 2;
const MEDIA_PAGE_SIZE: usize = 2;

/// Title and author
type Item = (&'static str, &'static str);

const CATALOG: &[(&str, &[Item])] = &[
    (
        "Books",
        &[
            ("The Rust Programming Language", "Klabnik, Nichols"),
            ("Programming Rust", "Blandy, Orendorff, Tindall"),
            ("Rust for Rustaceans", "Gjengset"),
        ],
    ),
    (
        "Talks",
        &[
            ("Type-Driven API Design in Rust", "Will Crichton"),
            ("Rust at speed", "Jon Gjengset"),
        ],
    ),
    (
        "Papers",
        &[
            ("RustBelt", "Jung et al."),
            ("Stacked Borrows", "Jung et al."),
            ("Tree Borrows", "Villani et al."),
            ("Oxide", "Weiss et al."),
        ],
    ),
    ("Podcasts", &[("New Rustacean", "Chris Krycho")]),
    ("Newsletters", &[("This Week in Rust", "Community")]),
];

fn type_id(route: &Route) -> anyhow::Result<usize> {
    let id: usize = route
        .arg("id")
        .ok_or_else(|| anyhow::anyhow!("route {route} has no type id"))?
        .parse()?;
    anyhow::ensure!(id < CATALOG.len(), "no media type {id}");
    Ok(id)
}

/// `<<  label  >>` row; arrows turn into spacers at the edges
fn pager(
    d: &Dispatcher,
    page: &PageController,
    label: String,
    previous: Route,
    next: Route,
) -> Vec<Button> {
    vec![
        match page.previous_page() {
            Some(_) => d.button("<<", &previous),
            None => d.noop_button(" "),
        },
        d.noop_button(label),
        match page.next_page() {
            Some(_) => d.button(">>", &next),
            None => d.noop_button(" "),
        },
    ]
}

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct TypesComponent;

impl TypesComponent {
    fn keyboard(d: &Dispatcher, page: &PageController) -> Keyboard {
        let mut keyboard: Keyboard = CATALOG[page.range()]
            .iter()
            .enumerate()
            .map(|(i, (name, _))| {
                let media = Route::new(MEDIA)
                    .with_path("/")
                    .with_arg("id", page.offset() + i);
                vec![d.button(*name, &media)]
            })
            .collect();
        keyboard.push(pager(
            d,
            page,
            format!("{}/{}", page.current_page(), page.pages_count()),
            Route::new(TYPES).with_path("/moveBack").meta(),
            Route::new(TYPES).with_path("/moveNext").meta(),
        ));
        keyboard.push(vec![d.close_button("Close")]);
        keyboard
    }

    /// Render the type list, creating its controller when the view has none
    fn render(
        d: &Dispatcher,
        key: ViewKey,
        step: impl FnOnce(&mut PageController),
    ) -> anyhow::Result<Keyboard> {
        let pages = &d.state().pages;
        if pages.get_page_titled(key, TYPES).is_none() {
            pages.create_page(key, CATALOG.len(), TYPES_PAGE_SIZE, Some(TYPES))?;
        }
        pages
            .with_page(key, Some(TYPES), |page| {
                step(page);
                Self::keyboard(d, page)
            })
            .ok_or_else(|| anyhow::anyhow!("type list of {key} has no page controller"))
    }
}

#[async_trait]
impl Component for TypesComponent {
    async fn initialize(
        &self,
        _route: &Route,
        target: &Target,
        dispatcher: &Dispatcher,
    ) -> anyhow::Result<Option<MessageRef>> {
        let transport = dispatcher.transport();
        let message = transport.send_message(target, "Loading...", None).await?;
        let keyboard = Self::render(dispatcher, message.key(), |_| {})?;
        transport
            .edit_message(message, "Select type", Some(&keyboard))
            .await?;
        Ok(Some(message))
    }

    async fn handle(&self, route: &Route, ctx: &CallbackContext) -> anyhow::Result<()> {
        let d = &ctx.dispatcher;
        let keyboard = match route.path() {
            "/" => Self::render(d, ctx.key(), |_| {})?,
            "/moveBack" => Self::render(d, ctx.key(), |page| {
                page.move_back();
            })?,
            "/moveNext" => Self::render(d, ctx.key(), |page| {
                page.move_next();
            })?,
            other => anyhow::bail!("types has no path {other:?}"),
        };
        ctx.transport()
            .edit_message(ctx.message, "Select type", Some(&keyboard))
            .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Media
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MediaComponent;

impl MediaComponent {
    fn view(
        d: &Dispatcher,
        id: usize,
        page: &PageController,
        footer: Keyboard,
    ) -> (String, Keyboard) {
        let (name, items) = CATALOG[id];
        let mut text = format!("{name}: page {} of {}\n", page.current_page(), page.pages_count());
        for (title, author) in &items[page.range()] {
            let _ = write!(text, "\n{title}\nAuthor: {author}\n");
        }

        let mut keyboard = vec![pager(
            d,
            page,
            name.to_string(),
            Route::new(MEDIA).with_path("/moveBack").with_arg("id", id).meta(),
            Route::new(MEDIA).with_path("/moveNext").with_arg("id", id).meta(),
        )];
        keyboard.extend(footer);
        (text, keyboard)
    }
}

#[async_trait]
impl Component for MediaComponent {
    async fn handle(&self, route: &Route, ctx: &CallbackContext) -> anyhow::Result<()> {
        let d = &ctx.dispatcher;
        let key = ctx.key();
        let id = type_id(route)?;
        let pages = &d.state().pages;

        let step: fn(&mut PageController) = match route.path() {
            "/" => {
                // Entering the list always starts a fresh cursor on top of the stack
                pages.create_page(key, CATALOG[id].1.len(), MEDIA_PAGE_SIZE, Some(MEDIA))?;
                |_| {}
            }
            "/moveBack" => |page| {
                page.move_back();
            },
            "/moveNext" => |page| {
                page.move_next();
            },
            other => anyhow::bail!("media has no path {other:?}"),
        };

        // History is read before the controller lock is taken
        let footer = d.back_and_close_rows(key, "Back", true, "Close");
        let (text, keyboard) = pages
            .with_page(key, Some(MEDIA), |page| {
                step(page);
                Self::view(d, id, page, footer)
            })
            .ok_or_else(|| anyhow::anyhow!("item list of {key} has no page controller"))?;
        ctx.transport()
            .edit_message(ctx.message, &text, Some(&keyboard))
            .await
    }
}
