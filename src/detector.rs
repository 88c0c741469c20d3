use super::catalog::Dataset;
use super::parser_data::ApplyTo;
use super::types::*;

/// Classify `ua` against `dataset`.
///
/// Robots are looked up by exact string and short-circuit everything else.
/// Otherwise the first browser pattern that finds a match wins, then the
/// operating system is detected unless the browser already determined it,
/// then the device category. Nothing matching is not an error: the affected
/// fields keep their `unknown` sentinel.
pub fn classify(ua: &str, dataset: &Dataset) -> UserAgent {
    let mut builder = UserAgentBuilder::default();

    if let Some(robot) = dataset.robot(ua) {
        robot.apply_to(&mut builder);
        builder.version = VersionNumber::parse_last(&robot.name);
        builder.device_category = DeviceCategory::Other;
        return builder.build();
    }

    detect_browser(ua, dataset, &mut builder);

    if builder.operating_system.is_unknown() {
        if let Some(m) = dataset.os_patterns().match_first(ua) {
            m.data.apply_to(&mut builder);
        }
    }

    if let Some(m) = dataset.device_patterns().match_first(ua) {
        builder.device_category = DeviceCategory::from_name(&m.data.name);
    }

    builder.build()
}

fn detect_browser(ua: &str, dataset: &Dataset, builder: &mut UserAgentBuilder) {
    let Some(m) = dataset.browser_patterns().match_first(ua) else {
        return;
    };
    m.data.apply_to(builder);
    if let Some(version) = m.version() {
        builder.name = format!("{} {}", m.data.family, version).into();
        builder.version = VersionNumber::parse(version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{sample_dataset, sample_document};
    use crate::checksum;
    use crate::db::{BrowserPatternEntry, PatternFields};

    const FIREFOX_WIN: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:102.0) Gecko/20100101 Firefox/102.0";
    const IPHONE: &str = concat!(
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 ",
        "(KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1"
    );

    #[test]
    fn unmatched_is_all_unknown() {
        let ua = classify("curl/8.4.0", &sample_dataset("1"));
        assert_eq!(ua, UserAgent::unknown());
        assert_eq!(ua.name(), UNKNOWN);
        assert_eq!(ua.operating_system().family(), UNKNOWN);
        assert_eq!(ua.device_category(), DeviceCategory::Unknown);
    }

    #[test]
    fn browser_and_os() {
        let ua = classify(FIREFOX_WIN, &sample_dataset("1"));
        assert_eq!(ua.family(), "Firefox");
        assert_eq!(ua.name(), "Firefox 102.0");
        assert_eq!(ua.type_name(), "Browser");
        assert_eq!(ua.kind(), UserAgentType::Browser);
        assert_eq!(ua.producer(), "Mozilla Foundation");
        assert_eq!(ua.version().major(), "102");
        assert_eq!(ua.operating_system().name(), "Windows 10");
    }

    #[test]
    fn browser_operating_system_wins_over_os_patterns() {
        // The Mobile Safari entry names iOS, so the pattern list is not consulted.
        let ua = classify(&format!("{} Linux", IPHONE), &sample_dataset("1"));
        assert_eq!(ua.family(), "Mobile Safari");
        assert_eq!(ua.kind(), UserAgentType::MobileBrowser);
        assert_eq!(ua.operating_system().family(), "iOS");
        assert_eq!(ua.device_category(), DeviceCategory::Smartphone);
    }

    #[test]
    fn version_group_absent_means_family_only() {
        let ua = classify("Mozilla/4.0 (compatible)", &sample_dataset("1"));
        assert_eq!(ua.family(), "Mozilla");
        assert_eq!(ua.name(), "Mozilla");
        assert!(ua.version().is_unknown());
    }

    #[test]
    fn integer_capture_gives_integer_version() {
        let mut doc = sample_document("1");
        doc.browser_patterns.insert(
            0,
            BrowserPatternEntry {
                pattern: PatternFields {
                    id: 99,
                    position: 0,
                    regex: "Firefox/(\\d+)".into(),
                    ..Default::default()
                },
                browser_id: 1,
                hash: String::new(),
            },
        );
        checksum::seal(&mut doc);
        let ds = Dataset::from_document(doc, true, &mut Vec::new()).unwrap();
        assert_eq!(classify(FIREFOX_WIN, &ds).name(), "Firefox 102");
    }

    #[test]
    fn robot_short_circuits_patterns() {
        // Registered verbatim as a robot, although browser and OS patterns also match.
        let mut doc = sample_document("1");
        doc.robots[0].user_agent_string = FIREFOX_WIN.into();
        checksum::seal(&mut doc);
        let ds = Dataset::from_document(doc, true, &mut Vec::new()).unwrap();

        let ua = classify(FIREFOX_WIN, &ds);
        assert!(ua.is_robot());
        assert_eq!(ua.family(), "Googlebot");
        assert_eq!(ua.name(), "Googlebot/2.1");
        assert_eq!(ua.type_name(), "Robot");
        assert_eq!(ua.version().to_string(), "2.1");
        assert_eq!(ua.device_category(), DeviceCategory::Other);
        assert!(ua.operating_system().is_unknown());
    }

    #[test]
    fn robot_requires_exact_match() {
        let ds = sample_dataset("1");
        let ua = classify("Googlebot/2.1 (+http://www.google.com/bot.html)", &ds);
        assert!(ua.is_robot());
        let ua = classify("Googlebot/2.1 (+http://www.google.com/bot.html) ", &ds);
        assert!(!ua.is_robot());
    }
}
