/// A link in the home page navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

impl NavLink {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

/// Static landing page with a sign-in and a sign-up link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomePage {
    pub title: String,
    pub description: String,
    pub links: [NavLink; 2],
}

impl Default for HomePage {
    fn default() -> Self {
        Self {
            title: "Welcome".to_string(),
            description: "A starter app backed by PocketBase. Sign in to manage your records, \
                          or create an account to get started."
                .to_string(),
            links: [NavLink::new("Sign in", "/login"), NavLink::new("Sign up", "/signup")],
        }
    }
}

impl HomePage {
    pub fn render(&self) -> String {
        let nav = self
            .links
            .iter()
            .map(|link| {
                format!(
                    "      <a href=\"{}\">{}</a>",
                    escape_html(&link.href),
                    escape_html(&link.label)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "<!DOCTYPE html>\n\
             <html lang=\"en\">\n\
             <head>\n\
             \x20 <meta charset=\"utf-8\">\n\
             \x20 <title>{title}</title>\n\
             </head>\n\
             <body>\n\
             \x20 <main>\n\
             \x20   <h1>{title}</h1>\n\
             \x20   <p>{description}</p>\n\
             \x20   <nav>\n\
             {nav}\n\
             \x20   </nav>\n\
             \x20 </main>\n\
             </body>\n\
             </html>\n",
            title = escape_html(&self.title),
            description = escape_html(&self.description),
            nav = nav,
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
