use anyhow::{Context, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, Event};

use crate::models::{Outcome, Report, TestRecord};

const CDATA_END: &str = "]]>";

/// Render `report` as an indented JUnit `testsuite` document.
pub fn render(report: &Report) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    let mut suite = BytesStart::new("testsuite");
    suite.push_attribute(("name", report.suite_name.as_str()));
    suite.push_attribute(("tests", report.tests.to_string().as_str()));
    suite.push_attribute(("failures", report.failures.to_string().as_str()));
    suite.push_attribute(("skipped", report.skipped.to_string().as_str()));
    suite.push_attribute(("errors", report.errors.to_string().as_str()));
    writer.write_event(Event::Start(suite))?;

    for record in &report.test_cases {
        write_test_case(&mut writer, record)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;

    let mut xml = String::from_utf8(writer.into_inner()).context("rendered XML is not UTF-8")?;
    xml.push('\n');
    Ok(xml)
}

fn write_test_case(writer: &mut Writer<Vec<u8>>, record: &TestRecord) -> Result<()> {
    let mut case = BytesStart::new("testcase");
    case.push_attribute(("name", record.name.as_str()));

    if matches!(record.outcome, Outcome::Pass) && record.captured_output.is_none() {
        writer.write_event(Event::Empty(case))?;
        return Ok(());
    }
    writer.write_event(Event::Start(case))?;

    match &record.outcome {
        Outcome::Pass => {}
        Outcome::Fail(failure) => {
            let mut element = BytesStart::new("failure");
            element.push_attribute(("message", failure.message.as_str()));
            write_cdata_element(writer, element, &failure.body)?;
        }
        Outcome::Skipped => {
            writer.write_event(Event::Empty(BytesStart::new("skipped")))?;
        }
        Outcome::Error(diagnostic) => {
            let mut element = BytesStart::new("error");
            if let Some(message) = &diagnostic.message {
                element.push_attribute(("message", message.as_str()));
            }
            write_cdata_element(writer, element, &diagnostic.body)?;
        }
    }

    if let Some(output) = &record.captured_output {
        write_cdata_element(writer, BytesStart::new("system-out"), output)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

fn write_cdata_element(
    writer: &mut Writer<Vec<u8>>,
    element: BytesStart<'_>,
    text: &str,
) -> Result<()> {
    let end = element.to_end().into_owned();
    writer.write_event(Event::Start(element))?;
    for section in cdata_sections(text) {
        writer.write_event(Event::CData(BytesCData::new(section)))?;
    }
    writer.write_event(Event::End(end))?;
    Ok(())
}

/// Split `text` so no section contains `]]>`: the terminator is cut between
/// `]]` and `>`, which land in adjacent sections.
fn cdata_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find(CDATA_END) {
        let cut = pos + 2;
        sections.push(&rest[..cut]);
        rest = &rest[cut..];
    }
    sections.push(rest);
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Diagnostic, Failure};

    fn sample() -> Report {
        let mut report = Report::new("foo.bar");
        report.push(TestRecord::new("it works", Outcome::Pass));
        report.push(TestRecord::new(
            "it breaks",
            Outcome::Fail(Failure {
                message: "expected 1, got 2".into(),
                body: "Passed in:\n(number) 1".into(),
            }),
        ));
        report
    }

    #[test_log::test]
    fn renders_suite_and_cases() {
        let xml = render(&sample()).unwrap();
        assert_eq!(
            xml,
            "<testsuite name=\"foo.bar\" tests=\"2\" failures=\"1\" skipped=\"0\" errors=\"0\">\n\
             \x20 <testcase name=\"it works\"/>\n\
             \x20 <testcase name=\"it breaks\">\n\
             \x20   <failure message=\"expected 1, got 2\"><![CDATA[Passed in:\n\
             (number) 1]]></failure>\n\
             \x20 </testcase>\n\
             </testsuite>\n"
        );
    }

    #[test_log::test]
    fn renders_skipped_error_and_output() {
        let mut report = Report::new("s");
        let mut skipped = TestRecord::new("later", Outcome::Skipped);
        skipped.captured_output = Some("hello".into());
        report.push(skipped);
        report.push(TestRecord::error("s", Diagnostic::new("boom")));

        let xml = render(&report).unwrap();
        assert!(xml.contains("<skipped/>"));
        assert!(xml.contains("<system-out><![CDATA[hello]]></system-out>"));
        assert!(xml.contains("<error><![CDATA[boom]]></error>"));
        assert!(xml.contains("errors=\"1\""));
    }

    #[test_log::test]
    fn escapes_attributes() {
        let mut report = Report::new("a<b>&\"c\"");
        report.push(TestRecord::error(
            "x",
            Diagnostic::with_message("1 < 2 & \"q\"", "body"),
        ));
        let xml = render(&report).unwrap();
        assert!(xml.contains("name=\"a&lt;b&gt;&amp;&quot;c&quot;\""));
        assert!(xml.contains("message=\"1 &lt; 2 &amp; &quot;q&quot;\""));
    }

    #[test_log::test]
    fn cdata_terminator_is_split() {
        assert_eq!(cdata_sections("a]]>b]]>c"), vec!["a]]", ">b]]", ">c"]);
        assert_eq!(cdata_sections("plain"), vec!["plain"]);

        let mut report = Report::new("s");
        report.push(TestRecord::error("x", Diagnostic::new("x]]>y")));
        let xml = render(&report).unwrap();
        assert!(xml.contains("<![CDATA[x]]]]><![CDATA[>y]]>"));
    }

    #[test_log::test]
    fn rendering_is_repeatable() {
        let report = sample();
        assert_eq!(render(&report).unwrap(), render(&report).unwrap());
    }
}
