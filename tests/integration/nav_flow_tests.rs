//! Navigation flows across the whole screen table.

use wxpanel::health::{PollOutcome, Service, ServiceState};
use wxpanel::nav::{Button, DataDeps, PressOutcome, ScreenId, ScreenNavigator};

fn on(screen: ScreenId) -> ScreenNavigator {
    let mut nav = ScreenNavigator::new();
    nav.force(screen);
    nav.take_dirty();
    nav
}

fn failed(service: Service) -> PollOutcome {
    PollOutcome {
        service,
        previous: ServiceState::Connected,
        state: ServiceState::Failed,
        changed: true,
    }
}

#[test]
fn every_button_lands_where_its_footer_says() {
    for screen in [ScreenId::Home, ScreenId::Forecast, ScreenId::History, ScreenId::Settings] {
        for button in Button::ALL {
            let mut nav = on(screen);
            let label = nav.footer(true)[button as usize];
            match nav.press(button, true) {
                PressOutcome::Navigated { from, to } => {
                    assert_eq!(from, screen);
                    assert_eq!(nav.descriptor(to).name, label);
                    assert!(nav.is_dirty());
                }
                other => panic!("{:?} on {:?} gave {:?}", button, screen, other),
            }
        }
    }
}

#[test]
fn status_unlocks_only_when_all_ready() {
    let mut nav = ScreenNavigator::new();
    assert_eq!(nav.press(Button::B, false), PressOutcome::Locked);
    assert_eq!(nav.current(), ScreenId::Status);
    assert_eq!(nav.auto_advance(false), None);

    assert_eq!(
        nav.press(Button::B, true),
        PressOutcome::Navigated {
            from: ScreenId::Status,
            to: ScreenId::Home
        }
    );
}

#[test]
fn alert_interrupts_any_screen_and_returns_home() {
    for screen in [
        ScreenId::Status,
        ScreenId::Home,
        ScreenId::Forecast,
        ScreenId::History,
        ScreenId::Settings,
    ] {
        let mut nav = on(screen);
        assert_eq!(nav.on_alert(), Some(screen));
        assert_eq!(nav.current(), ScreenId::Alert);
        assert_eq!(nav.press(Button::A, true), PressOutcome::Ignored);
        assert_eq!(nav.press(Button::C, true), PressOutcome::Ignored);
        assert_eq!(
            nav.press(Button::B, true),
            PressOutcome::Dismissed { to: ScreenId::Home }
        );
    }
}

#[test]
fn repeated_alert_only_redraws() {
    let mut nav = on(ScreenId::Alert);
    assert_eq!(nav.on_alert(), None);
    assert_eq!(nav.current(), ScreenId::Alert);
    assert!(nav.take_dirty());
}

#[test]
fn failure_pulls_back_to_status_from_anywhere() {
    for screen in [ScreenId::Home, ScreenId::Settings, ScreenId::Alert] {
        let mut nav = on(screen);
        assert_eq!(nav.on_health(&failed(Service::Broker)), Some(screen));
        assert_eq!(nav.current(), ScreenId::Status);
    }

    // Already on Status: redraw only.
    let mut nav = on(ScreenId::Status);
    assert_eq!(nav.on_health(&failed(Service::Wifi)), None);
    assert!(nav.take_dirty());
}

#[test]
fn recovery_does_not_navigate() {
    let mut nav = on(ScreenId::Settings);
    let recovered = PollOutcome {
        service: Service::Sensor,
        previous: ServiceState::Failed,
        state: ServiceState::Connected,
        changed: true,
    };
    assert_eq!(nav.on_health(&recovered), None);
    assert_eq!(nav.current(), ScreenId::Settings);
    // Settings lists the services, so it redraws.
    assert!(nav.take_dirty());
}

#[test]
fn data_changes_only_dirty_dependent_screens() {
    let mut nav = on(ScreenId::Forecast);
    nav.invalidate(DataDeps::SENSOR | DataDeps::HISTORY);
    assert!(!nav.is_dirty());
    nav.invalidate(DataDeps::FORECAST);
    assert!(nav.take_dirty());

    let mut nav = on(ScreenId::Home);
    nav.invalidate(DataDeps::ALERT);
    assert!(!nav.is_dirty());
    nav.invalidate(DataDeps::SETTINGS);
    assert!(nav.is_dirty());
}

#[test]
fn named_navigation() {
    let mut nav = ScreenNavigator::new();
    assert_eq!(nav.navigate_to("history"), Some(ScreenId::Status));
    assert_eq!(nav.current(), ScreenId::History);
    assert_eq!(nav.navigate_to("history"), None);
    assert_eq!(nav.navigate_to("History"), None);
    assert_eq!(nav.navigate_to(""), None);
    assert_eq!(nav.current(), ScreenId::History);
}
