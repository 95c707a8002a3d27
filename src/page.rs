//! Page object for the game's main page

use crate::browser;
use crate::config::Config;
use crate::driver::DriverSession;
use crate::error::Result;
use crate::trace;
use fantoccini::elements::Element;
use tracing::error;

/// XPath locators for the known page structure: a status title, a
/// "New Game" button and a 3×3 grid of square buttons.
pub mod locators {
    pub const TITLE: &str = "//div[@class='game-info']/div[1]";
    pub const NEW_GAME: &str = "//button[text()='New Game']";
    pub const BOARD_ROWS: &str = "//div[@class='game-board']/div[@class='board-row']";

    /// Locator for one board cell; row and column are 1-based.
    pub fn board_cell(row: usize, col: usize) -> String {
        format!("{}[{}]/button[{}]", BOARD_ROWS, row, col)
    }
}

/// The main page of the game application
pub struct BasePage {
    base_url: String,
    ui_delay: f64,
}

impl BasePage {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.app.base_url.clone(),
            ui_delay: config.app.ui_delay,
        }
    }

    pub fn ui_delay(&self) -> f64 {
        self.ui_delay
    }

    /// Navigate to the page and wait for the url to settle. Soft result:
    /// any failure along the way is logged and reported as `false` for the
    /// caller to assert on.
    pub async fn open(&self, session: &DriverSession) -> bool {
        trace::entry("BasePage", "open");
        if let Err(e) = browser::go_to_url(session, &self.base_url).await {
            error!("open failed with error: {}", e);
            return false;
        }
        browser::wait_url_contains(session, &self.base_url, self.ui_delay).await
    }

    /// The innerHTML of the status title.
    pub async fn title_html(&self, session: &DriverSession) -> Result<String> {
        let element = browser::find_element(session, locators::TITLE).await?;
        browser::inner_html(&element).await
    }

    pub async fn new_game_button(&self, session: &DriverSession) -> Result<Element> {
        browser::find_element(session, locators::NEW_GAME).await
    }

    /// Click the board cell at (row, col), 1-based.
    pub async fn click_cell(&self, session: &DriverSession, row: usize, col: usize) -> Result<()> {
        let element = browser::find_element(session, &locators::board_cell(row, col)).await?;
        browser::click_element(&element).await
    }

    /// Soft-wait for a cell to be clickable; `false` means the cell is
    /// dead (e.g. the game is already decided).
    pub async fn wait_cell_clickable(
        &self,
        session: &DriverSession,
        row: usize,
        col: usize,
    ) -> bool {
        browser::wait_element_clickable(session, &locators::board_cell(row, col), self.ui_delay)
            .await
    }
}
