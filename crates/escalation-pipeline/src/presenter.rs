//! The framework's `Exceptions` component: plain text under CLI, HTML
//! fragments otherwise.

use bootstrap_types::{ErrorPage, ErrorPresenter, ErrorTemplate, FailureRecord, Fault, Interface};
use std::fmt::Write;

pub struct DefaultErrorPresenter {
    interface: Interface,
}

impl DefaultErrorPresenter {
    pub fn new(interface: Interface) -> Self {
        Self { interface }
    }

    fn is_cli(&self) -> bool {
        self.interface.is_cli()
    }
}

impl ErrorPresenter for DefaultErrorPresenter {
    fn render_php_error(&self, record: &FailureRecord) -> String {
        let severity = record.severity.label();
        if self.is_cli() {
            return format!(
                "A PHP Error was encountered\n\n\
                 Severity:    {severity}\n\
                 Message:     {}\n\
                 Filename:    {}\n\
                 Line Number: {}\n\n",
                record.message, record.location.file, record.location.line
            );
        }

        format!(
            "<div class=\"php-error\">\n\
             <h4>A PHP Error was encountered</h4>\n\
             <p>Severity: {}</p>\n\
             <p>Message:  {}</p>\n\
             <p>Filename: {}</p>\n\
             <p>Line Number: {}</p>\n\
             </div>\n",
            escape(&severity),
            escape(&record.message),
            escape(&record.location.file),
            record.location.line
        )
    }

    fn render_exception(&self, fault: &Fault) -> String {
        if self.is_cli() {
            let mut out = format!(
                "An uncaught Exception was encountered\n\n\
                 Type:        {}\n\
                 Message:     {}\n\
                 Filename:    {}\n\
                 Line Number: {}\n",
                fault.kind, fault.message, fault.location.file, fault.location.line
            );
            if !fault.causes.is_empty() {
                out.push_str("\nCaused by:\n");
                for cause in &fault.causes {
                    let _ = writeln!(out, "\t{cause}");
                }
            }
            out.push('\n');
            return out;
        }

        let mut out = format!(
            "<div class=\"php-error\">\n\
             <h4>An uncaught Exception was encountered</h4>\n\
             <p>Type: {}</p>\n\
             <p>Message: {}</p>\n\
             <p>Filename: {}</p>\n\
             <p>Line Number: {}</p>\n",
            escape(&fault.kind),
            escape(&fault.message),
            escape(&fault.location.file),
            fault.location.line
        );
        if !fault.causes.is_empty() {
            out.push_str("<p>Caused by:</p>\n<ul>\n");
            for cause in &fault.causes {
                let _ = writeln!(out, "<li>{}</li>", escape(cause));
            }
            out.push_str("</ul>\n");
        }
        out.push_str("</div>\n");
        out
    }

    fn render_error(&self, page: &ErrorPage) -> String {
        if self.is_cli() {
            let label = match page.template {
                ErrorTemplate::NotFound => "NOT FOUND",
                ErrorTemplate::General => "ERROR",
            };
            return format!(
                "\n{label}: {}\n\n{}\n\n",
                page.heading,
                page.messages.join("\n")
            );
        }

        let mut body = String::new();
        for message in &page.messages {
            let _ = writeln!(body, "<p>{}</p>", escape(message));
        }
        format!(
            "<!DOCTYPE html>\n\
             <html lang=\"en\">\n\
             <head>\n<meta charset=\"utf-8\">\n<title>{heading}</title>\n</head>\n\
             <body>\n<div id=\"container\" class=\"{template}\">\n\
             <h1>{heading}</h1>\n\
             {body}\
             </div>\n</body>\n</html>\n",
            heading = escape(&page.heading),
            template = page.template.name(),
        )
    }
}

/// Escape text for an HTML body or attribute.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
