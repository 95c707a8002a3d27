//! UI tests for the main page
//!
//! These drive a real browser against a running instance of the game, so
//! they are ignored by default. Run them with a driver binary on PATH (or
//! configured in config.toml) and the app served at the configured
//! base_url:
//!
//! ```text
//! cargo test --test ui_main_page -- --ignored
//! ```

use game_automation::page::locators;
use game_automation::{browser, BasePage, Config, DriverFixture, RunTimer};
use std::path::Path;

fn load_config() -> Config {
    Config::load(Path::new("config.toml")).unwrap()
}

#[tokio::test]
#[ignore = "requires a webdriver binary and the running game app"]
async fn default_title_shows_next_player() {
    let config = load_config();
    let _timer = RunTimer::start("TestMainPage/1");
    let fixture = DriverFixture::setup(&config, Some("chrome")).await.unwrap();
    let page = BasePage::new(&config);

    assert!(page.open(&fixture.session).await);
    let title = page.title_html(&fixture.session).await.unwrap();
    assert_eq!(title, "Next player: X");

    fixture.teardown().await;
}

#[tokio::test]
#[ignore = "requires a webdriver binary and the running game app"]
async fn new_game_button_is_clickable() {
    let config = load_config();
    let _timer = RunTimer::start("TestMainPage/2");
    let fixture = DriverFixture::setup(&config, Some("chrome")).await.unwrap();
    let page = BasePage::new(&config);

    assert!(page.open(&fixture.session).await);
    let button = page.new_game_button(&fixture.session).await.unwrap();
    assert!(button.is_displayed().await.unwrap());
    assert!(button.is_enabled().await.unwrap());

    fixture.teardown().await;
}

#[tokio::test]
#[ignore = "requires a webdriver binary and the running game app"]
async fn pointer_driven_moves_update_the_title() {
    let config = load_config();
    let _timer = RunTimer::start("TestMainPage/3");
    let fixture = DriverFixture::setup(&config, Some("chrome")).await.unwrap();
    let page = BasePage::new(&config);

    assert!(page.open(&fixture.session).await);

    let cell = browser::find_element(&fixture.session, &locators::board_cell(1, 1))
        .await
        .unwrap();
    browser::hover_over_element_and_click(&fixture.session, &cell)
        .await
        .unwrap();
    assert_eq!(
        page.title_html(&fixture.session).await.unwrap(),
        "Next player: O"
    );

    let cell = browser::find_element(&fixture.session, &locators::board_cell(1, 2))
        .await
        .unwrap();
    browser::try_click(&fixture.session, &cell, 0.2).await.unwrap();
    assert_eq!(
        page.title_html(&fixture.session).await.unwrap(),
        "Next player: X"
    );

    fixture.teardown().await;
}

#[tokio::test]
#[ignore = "requires a webdriver binary and the running game app"]
async fn a_second_tab_closes_without_ending_the_session() {
    let config = load_config();
    let _timer = RunTimer::start("TestMainPage/4");
    let fixture = DriverFixture::setup(&config, Some("chrome")).await.unwrap();
    let page = BasePage::new(&config);

    assert!(page.open(&fixture.session).await);
    browser::open_new_tab(&fixture.session).await.unwrap();

    let windows = fixture.session.client().windows().await.unwrap();
    assert_eq!(windows.len(), 2);

    fixture
        .session
        .client()
        .switch_to_window(windows[1].clone())
        .await
        .unwrap();
    browser::close_tab(&fixture.session).await.unwrap();
    fixture
        .session
        .client()
        .switch_to_window(windows[0].clone())
        .await
        .unwrap();

    assert!(browser::current_url(&fixture.session).await.is_ok());

    fixture.teardown().await;
}
