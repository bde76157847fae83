//! Server-side HTML for the schedule pages.

use chrono::{Datelike, Duration, NaiveDate};

use crate::calendar::{self, EventsByWeek};
use crate::model::division::Division;
use crate::model::division_location::DivisionLocation;
use crate::model::event::Event;
use crate::model::team::Team;

const SITE_NAME: &str = "Minor Hockey Schedule";

/// One menu section: a division and the teams playing in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavSection {
    pub title: String,
    pub links: Vec<NavLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub href: String,
    pub title: String,
}

/// Teams and rinks referenced by the events being rendered.
pub struct EventContext<'a> {
    pub teams: &'a [Team],
    pub locations: &'a [DivisionLocation],
}

impl EventContext<'_> {
    fn team(&self, id: Option<i64>) -> Option<&Team> {
        let id = id?;
        self.teams.iter().find(|t| t.id == id)
    }

    fn location(&self, id: Option<i64>) -> Option<&DivisionLocation> {
        let id = id?;
        self.locations.iter().find(|l| l.id == id)
    }
}

/// One section per division of the tree, listing the teams whose `division_id` matches.
pub fn build_nav(tree: &[Division], teams: &[Team]) -> Vec<NavSection> {
    tree.iter()
        .map(|division| NavSection {
            title: division.name.clone().unwrap_or_else(|| division.id.to_string()),
            links: teams
                .iter()
                .filter(|team| team.division_id == Some(division.id))
                .map(|team| NavLink {
                    href: if team.is_all() { "/".to_string() } else { format!("/teams/{}", team.id) },
                    title: team.display_name(),
                })
                .collect(),
        })
        .collect()
}

pub fn layout(title: &str, nav: &[NavSection], body: &str) -> String {
    let mut menu = String::new();
    for section in nav {
        menu.push_str("<div class=\"nav-section\">\n");
        menu.push_str(&format!("<h4>{}</h4>\n", escape_html(&section.title)));
        for link in &section.links {
            menu.push_str(&format!(
                "<a href=\"{}\">{}</a>\n",
                escape_html(&link.href),
                escape_html(&link.title)
            ));
        }
        menu.push_str("</div>\n");
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{title} | {SITE_NAME}</title>\n</head>\n<body>\n\
<header class=\"site-header\">\n<a href=\"/\">{SITE_NAME}</a>\n<nav>\n{menu}</nav>\n</header>\n\
<main>\n{body}</main>\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

/// Heading, season line, then every week and day of `grouped` in order.
pub fn events_page(
    heading: &str,
    season_name: Option<&str>,
    grouped: &EventsByWeek<'_>,
    context: &EventContext<'_>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("<h1>{}</h1>\n", escape_html(heading)));
    if let Some(season) = season_name {
        out.push_str(&format!("<p class=\"season\">Events for the {} season.</p>\n", escape_html(season)));
    }
    if grouped.is_empty() {
        out.push_str("<p class=\"empty\">No upcoming events.</p>\n");
        return out;
    }

    for (week, days) in grouped {
        let Some(monday) = calendar::parse_week_key(week) else {
            continue;
        };
        let sunday = monday + Duration::days(6);
        out.push_str(&format!("<section class=\"week\" id=\"week-{}\">\n", calendar::day_key(monday)));
        out.push_str(&format!(
            "<h2>Week {} - {}</h2>\n",
            monday.format("%b %d"),
            sunday.format("%b %d")
        ));

        for (day, events) in days {
            let Some(date) = calendar::parse_day_key(day) else {
                continue;
            };
            out.push_str(&format!("<div class=\"day\" id=\"{day}\">\n<h3>{}</h3>\n", day_heading(date)));
            if events.is_empty() {
                out.push_str("<p class=\"empty\">No event found</p>\n");
            }
            for event in events {
                out.push_str(&event_card(event, context));
            }
            out.push_str("</div>\n");
        }
        out.push_str("</section>\n");
    }
    out
}

/// Child divisions of `division`, each with its team list.
pub fn teams_page(division: &Division, tree: &[Division], teams: &[Team]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<h1>Division - {}</h1>\n",
        escape_html(division.name.as_deref().unwrap_or(""))
    ));
    if let Some(season) = division.season_name.as_deref() {
        out.push_str(&format!("<p>Season: <strong>{}</strong></p>\n", escape_html(season)));
    }

    for child in tree.iter().filter(|d| d.parent_id == Some(division.id)) {
        out.push_str(&format!(
            "<h2>{}</h2>\n<ul>\n",
            escape_html(child.name.as_deref().unwrap_or(""))
        ));
        for team in teams.iter().filter(|t| t.division_id == Some(child.id)) {
            out.push_str(&format!(
                "<li><a href=\"/teams/{}\">{}</a></li>\n",
                team.id,
                escape_html(&team.display_name())
            ));
        }
        out.push_str("</ul>\n");
    }
    out
}

pub fn error_page(status: u16, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{status} | {SITE_NAME}</title>\n</head>\n<body>\n<main>\n\
<h1>{status}</h1>\n<p>{}</p>\n<a href=\"/\">Back to the schedule</a>\n</main>\n</body>\n</html>\n",
        escape_html(message)
    )
}

fn event_card(event: &Event, context: &EventContext<'_>) -> String {
    let time = match calendar::convert_event_start_date(event) {
        Ok(Some(start)) => start.format("%I:%M %p").to_string(),
        _ => "TBD".to_string(),
    };
    let name = event.name.as_deref().unwrap_or("");

    let mut card = String::from("<article class=\"card\">\n");
    card.push_str(&format!(
        "<h4 class=\"card-title\">{} - {}</h4>\n",
        escape_html(&time),
        escape_html(name)
    ));

    card.push_str("<p class=\"card-description\">");
    if let Some(team) = context.team(event.team_id) {
        card.push_str(&format!(
            "<a href=\"/teams/{}\">{}</a>",
            team.id,
            escape_html(&team.display_name())
        ));
    }
    if event.is_game_event() {
        card.push_str(" <span class=\"tag game\">Game</span>");
    }
    if event.is_canceled() {
        card.push_str(" <span class=\"tag canceled\">Canceled</span>");
    }
    card.push_str("</p>\n");

    if let Some(location) = context.location(event.division_location_id) {
        card.push_str("<div class=\"location\">\n");
        card.push_str(&format!(
            "<p class=\"location-name\">{}</p>\n",
            escape_html(location.name.as_deref().unwrap_or(""))
        ));
        if let Some(address) = location.address.as_deref().filter(|a| !a.trim().is_empty()) {
            card.push_str(&format!("<p class=\"location-address\">{}</p>\n", escape_html(address)));
            card.push_str(&format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noreferrer\">View Location on Google Maps</a>\n",
                escape_html(&google_maps_url(address))
            ));
        }
        card.push_str("</div>\n");
    }
    card.push_str("</article>\n");
    card
}

/// "Monday, January 1st"
pub fn day_heading(date: NaiveDate) -> String {
    format!("{} {}", date.format("%A, %B"), ordinal(date.day()))
}

pub fn google_maps_url(address: &str) -> String {
    let query: String = form_urlencoded::byte_serialize(address.as_bytes()).collect();
    format!("https://www.google.com/maps?q={query}")
}

fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{day}{suffix}")
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
