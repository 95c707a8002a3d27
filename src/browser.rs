//! Stateless wrapper over a driver session
//!
//! Each operation takes the session (and a locator or an already-found
//! element) and performs exactly one browser action. Locators are XPath
//! strings, recomputed per lookup.
//!
//! Lookup and action failures propagate as errors. The `wait_*` family is
//! the exception: a timed-out wait is logged at error level and reported as
//! a sentinel `false` so the caller can assert on it.

use crate::driver::DriverSession;
use crate::error::{AutomationError, Result};
use crate::trace;
use fantoccini::actions::{InputSource, MouseActions, PointerAction, MOUSE_BUTTON_LEFT};
use fantoccini::elements::Element;
use fantoccini::Locator;
use serde_json::Value;
use std::time::Duration;
use tracing::error;

/// WebDriver key code for ENTER
pub const ENTER_KEY: &str = "\u{e007}";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Navigate to a url and size the window for the UI tests.
pub async fn go_to_url(session: &DriverSession, url: &str) -> Result<()> {
    trace::traced_async("Browser", "go_to_url", async {
        session.client().goto(url).await?;
        session.client().set_window_size(1920, 1080).await?;
        Ok(())
    })
    .await
}

/// Current url of the browser state.
pub async fn current_url(session: &DriverSession) -> Result<String> {
    trace::traced_async("Browser", "current_url", async {
        Ok(session.client().current_url().await?.to_string())
    })
    .await
}

/// Find a single element without waiting. Lookup failures propagate.
pub async fn find_element(session: &DriverSession, xpath: &str) -> Result<Element> {
    trace::traced_async("Browser", "find_element", async {
        Ok(session.client().find(Locator::XPath(xpath)).await?)
    })
    .await
}

/// Find every element matching the locator.
pub async fn find_elements(session: &DriverSession, xpath: &str) -> Result<Vec<Element>> {
    trace::traced_async("Browser", "find_elements", async {
        Ok(session.client().find_all(Locator::XPath(xpath)).await?)
    })
    .await
}

/// Click an already-found element.
pub async fn click_element(element: &Element) -> Result<()> {
    trace::traced_async("Browser", "click_element", async {
        element.click().await?;
        Ok(())
    })
    .await
}

/// Wait for the element to become clickable, then click it. A timed-out
/// wait here is a hard error: the caller asked to click, not to probe.
pub async fn click_by_locator(session: &DriverSession, xpath: &str, delay: f64) -> Result<()> {
    trace::traced_async("Browser", "click_by_locator", async {
        if !wait_element_clickable(session, xpath, delay).await {
            return Err(AutomationError::Timeout(xpath.to_string()));
        }
        let element = session.client().find(Locator::XPath(xpath)).await?;
        element.click().await?;
        Ok(())
    })
    .await
}

/// Move the pointer onto an element, then click it.
pub async fn hover_over_element_and_click(
    session: &DriverSession,
    element: &Element,
) -> Result<()> {
    trace::traced_async("Browser", "hover_over_element_and_click", async {
        let mouse = MouseActions::new("mouse".to_string())
            .then(PointerAction::MoveToElement {
                element: element.clone(),
                duration: None,
                x: 0,
                y: 0,
            })
            .then(PointerAction::Down {
                button: MOUSE_BUTTON_LEFT,
            })
            .then(PointerAction::Up {
                button: MOUSE_BUTTON_LEFT,
            });
        session.client().perform_actions(mouse).await?;
        Ok(())
    })
    .await
}

/// Move onto an element and click it with a pause on either side of the
/// click, for UIs that react to pointer movement.
pub async fn try_click(session: &DriverSession, element: &Element, delay: f64) -> Result<()> {
    trace::traced_async("Browser", "try_click", async {
        let pause = Duration::from_secs_f64(delay);
        let mouse = MouseActions::new("mouse".to_string())
            .then(PointerAction::MoveToElement {
                element: element.clone(),
                duration: None,
                x: 0,
                y: 0,
            })
            .then(PointerAction::Pause { duration: pause })
            .then(PointerAction::Down {
                button: MOUSE_BUTTON_LEFT,
            })
            .then(PointerAction::Up {
                button: MOUSE_BUTTON_LEFT,
            })
            .then(PointerAction::Pause { duration: pause });
        session.client().perform_actions(mouse).await?;
        Ok(())
    })
    .await
}

/// Clear a field and type into it.
pub async fn type_text(element: &Element, text: &str) -> Result<()> {
    trace::traced_async("Browser", "type_text", async {
        element.clear().await?;
        element.send_keys(text).await?;
        Ok(())
    })
    .await
}

/// Clear a field, type into it and submit with ENTER.
pub async fn input_data(element: &Element, text: &str) -> Result<()> {
    trace::traced_async("Browser", "input_data", async {
        element.clear().await?;
        element.send_keys(text).await?;
        element.send_keys(ENTER_KEY).await?;
        Ok(())
    })
    .await
}

/// Wait for the element, focus it, then clear-type-ENTER.
pub async fn type_by_locator(
    session: &DriverSession,
    xpath: &str,
    text: &str,
    delay: f64,
) -> Result<()> {
    trace::traced_async("Browser", "type_by_locator", async {
        let element = search_element(session, xpath, delay)
            .await
            .ok_or_else(|| AutomationError::Timeout(xpath.to_string()))?;
        element.click().await?;
        element.clear().await?;
        element.send_keys(text).await?;
        element.send_keys(ENTER_KEY).await?;
        Ok(())
    })
    .await
}

/// Send the ENTER key to an element.
pub async fn send_enter(element: &Element) -> Result<()> {
    trace::traced_async("Browser", "send_enter", async {
        element.send_keys(ENTER_KEY).await?;
        Ok(())
    })
    .await
}

/// Clear an input field.
pub async fn clear_field(element: &Element) -> Result<()> {
    trace::traced_async("Browser", "clear_field", async {
        element.clear().await?;
        Ok(())
    })
    .await
}

/// Attribute value of an already-found element.
pub async fn attribute(element: &Element, name: &str) -> Result<Option<String>> {
    trace::traced_async("Browser", "attribute", async { Ok(element.attr(name).await?) }).await
}

/// Attribute value of the element behind a locator.
pub async fn attribute_by_locator(
    session: &DriverSession,
    xpath: &str,
    name: &str,
) -> Result<Option<String>> {
    trace::traced_async("Browser", "attribute_by_locator", async {
        let element = session.client().find(Locator::XPath(xpath)).await?;
        Ok(element.attr(name).await?)
    })
    .await
}

/// The `innerHTML` property of an element.
pub async fn inner_html(element: &Element) -> Result<String> {
    trace::traced_async("Browser", "inner_html", async {
        Ok(element.prop("innerHTML").await?.unwrap_or_default())
    })
    .await
}

/// Run a script in the page, returning its result.
pub async fn execute_js(session: &DriverSession, script: &str, args: Vec<Value>) -> Result<Value> {
    trace::traced_async("Browser", "execute_js", async {
        Ok(session.client().execute(script, args).await?)
    })
    .await
}

/// Open a blank tab.
pub async fn open_new_tab(session: &DriverSession) -> Result<()> {
    execute_js(session, r#"window.open("about:blank", "_blank");"#, vec![])
        .await
        .map(|_| ())
}

/// Close the current tab. The session stays alive as long as another
/// window remains open.
pub async fn close_tab(session: &DriverSession) -> Result<()> {
    trace::traced_async("Browser", "close_tab", async {
        session.client().clone().close_window().await?;
        Ok(())
    })
    .await
}

pub async fn refresh(session: &DriverSession) -> Result<()> {
    trace::traced_async("Browser", "refresh", async {
        session.client().refresh().await?;
        Ok(())
    })
    .await
}

pub async fn back(session: &DriverSession) -> Result<()> {
    trace::traced_async("Browser", "back", async {
        session.client().back().await?;
        Ok(())
    })
    .await
}

pub async fn forward(session: &DriverSession) -> Result<()> {
    trace::traced_async("Browser", "forward", async {
        session.client().forward().await?;
        Ok(())
    })
    .await
}

/// History step back through the page's own script context.
pub async fn go_back_js(session: &DriverSession) -> Result<()> {
    execute_js(session, "window.history.go(-1)", vec![]).await.map(|_| ())
}

/// Select a `<select>` option by value.
pub async fn select_by_value(element: &Element, value: &str) -> Result<()> {
    trace::traced_async("Browser", "select_by_value", async {
        element.select_by_value(value).await?;
        Ok(())
    })
    .await
}

/// Select a `<select>` option by index.
pub async fn select_by_index(element: &Element, index: usize) -> Result<()> {
    trace::traced_async("Browser", "select_by_index", async {
        element.select_by_index(index).await?;
        Ok(())
    })
    .await
}

/// Wait for an element to be present, returning it. Soft: `None` on
/// timeout, logged.
pub async fn search_element(session: &DriverSession, xpath: &str, delay: f64) -> Option<Element> {
    trace::entry("Browser", "search_element");
    let deadline = tokio::time::Instant::now() + Duration::from_secs_f64(delay);

    loop {
        if let Ok(element) = session.client().find(Locator::XPath(xpath)).await {
            return Some(element);
        }
        if expired(deadline, "search_element", xpath).await {
            return None;
        }
    }
}

/// Wait for an element to become visible.
pub async fn wait_element_visible(session: &DriverSession, xpath: &str, delay: f64) -> bool {
    trace::entry("Browser", "wait_element_visible");
    let deadline = tokio::time::Instant::now() + Duration::from_secs_f64(delay);

    loop {
        if let Ok(element) = session.client().find(Locator::XPath(xpath)).await {
            if element.is_displayed().await.unwrap_or(false) {
                return true;
            }
        }
        if expired(deadline, "wait_element_visible", xpath).await {
            return false;
        }
    }
}

/// Wait for an element to be present in the DOM.
pub async fn wait_element_present(session: &DriverSession, xpath: &str, delay: f64) -> bool {
    trace::entry("Browser", "wait_element_present");
    let deadline = tokio::time::Instant::now() + Duration::from_secs_f64(delay);

    loop {
        if session.client().find(Locator::XPath(xpath)).await.is_ok() {
            return true;
        }
        if expired(deadline, "wait_element_present", xpath).await {
            return false;
        }
    }
}

/// Wait for an element to be displayed and enabled.
pub async fn wait_element_clickable(session: &DriverSession, xpath: &str, delay: f64) -> bool {
    trace::entry("Browser", "wait_element_clickable");
    let deadline = tokio::time::Instant::now() + Duration::from_secs_f64(delay);

    loop {
        if let Ok(element) = session.client().find(Locator::XPath(xpath)).await {
            let displayed = element.is_displayed().await.unwrap_or(false);
            let enabled = element.is_enabled().await.unwrap_or(false);
            if displayed && enabled {
                return true;
            }
        }
        if expired(deadline, "wait_element_clickable", xpath).await {
            return false;
        }
    }
}

/// Wait for an element to be selected.
pub async fn wait_element_selected(session: &DriverSession, xpath: &str, delay: f64) -> bool {
    trace::entry("Browser", "wait_element_selected");
    let deadline = tokio::time::Instant::now() + Duration::from_secs_f64(delay);

    loop {
        if let Ok(element) = session.client().find(Locator::XPath(xpath)).await {
            if element.is_selected().await.unwrap_or(false) {
                return true;
            }
        }
        if expired(deadline, "wait_element_selected", xpath).await {
            return false;
        }
    }
}

/// Wait for an element to disappear from the DOM.
pub async fn wait_element_not_present(session: &DriverSession, xpath: &str, delay: f64) -> bool {
    trace::entry("Browser", "wait_element_not_present");
    let deadline = tokio::time::Instant::now() + Duration::from_secs_f64(delay);

    loop {
        if session.client().find(Locator::XPath(xpath)).await.is_err() {
            return true;
        }
        if expired(deadline, "wait_element_not_present", xpath).await {
            return false;
        }
    }
}

/// Wait for the current url to contain a fragment.
pub async fn wait_url_contains(session: &DriverSession, fragment: &str, delay: f64) -> bool {
    trace::entry("Browser", "wait_url_contains");
    let deadline = tokio::time::Instant::now() + Duration::from_secs_f64(delay);

    loop {
        if let Ok(url) = session.client().current_url().await {
            if url.as_str().contains(fragment) {
                return true;
            }
        }
        if expired(deadline, "wait_url_contains", fragment).await {
            return false;
        }
    }
}

/// Wait for the current url to match a regular expression.
pub async fn wait_url_matches(session: &DriverSession, pattern: &str, delay: f64) -> bool {
    trace::entry("Browser", "wait_url_matches");
    let regex = match regex::Regex::new(pattern) {
        Ok(regex) => regex,
        Err(e) => {
            error!("wait_url_matches got an invalid pattern {:?}: {}", pattern, e);
            return false;
        }
    };
    let deadline = tokio::time::Instant::now() + Duration::from_secs_f64(delay);

    loop {
        if let Ok(url) = session.client().current_url().await {
            if regex.is_match(url.as_str()) {
                return true;
            }
        }
        if expired(deadline, "wait_url_matches", pattern).await {
            return false;
        }
    }
}

/// Timeout bookkeeping for the wait loops: logs and reports expiry, or
/// sleeps one poll interval.
async fn expired(deadline: tokio::time::Instant, operation: &str, subject: &str) -> bool {
    if tokio::time::Instant::now() >= deadline {
        error!("{} timed out waiting for {:?}", operation, subject);
        return true;
    }
    tokio::time::sleep(POLL_INTERVAL).await;
    false
}
