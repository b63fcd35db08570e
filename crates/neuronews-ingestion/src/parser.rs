//! Citation-record parser: efetch XML → normalized [`ArticleRecord`]s.
//!
//! Each entry is extracted independently; a malformed entry yields a
//! partial record with policy defaults rather than aborting the batch.

use neuronews_common::defaults::default_for;
use neuronews_common::Result;

use crate::models::ArticleRecord;
use crate::xml::{parse_document, XmlNode};

const ARTICLE_URL_BASE: &str = "https://pubmed.ncbi.nlm.nih.gov";

/// Maximum number of subject-heading terms carried on a record.
const MESH_TERM_CAP: usize = 10;

/// Parse one efetch result document. Output order matches entry order.
pub fn parse_articles(xml: &str) -> Result<Vec<ArticleRecord>> {
    let root = parse_document(xml)?;
    let entries: Vec<&XmlNode> = match root.child("PubmedArticleSet") {
        Some(set) => set.children("PubmedArticle").collect(),
        None => root.children("PubmedArticle").collect(),
    };
    Ok(entries.into_iter().map(extract_record).collect())
}

/// Extract every field of one `PubmedArticle` entry, best-effort.
pub fn extract_record(entry: &XmlNode) -> ArticleRecord {
    let mut rec = ArticleRecord::default();

    let Some(citation) = entry.child("MedlineCitation") else {
        return rec;
    };

    rec.pmid = citation.child_text("PMID").unwrap_or_default();
    if !rec.pmid.is_empty() {
        rec.url = format!("{ARTICLE_URL_BASE}/{}/", rec.pmid);
    }

    if let Some(coi) = citation.child_text("CoiStatement").filter(|s| !s.is_empty()) {
        rec.coi_statement = coi;
    }
    rec.mesh_terms = extract_mesh_terms(citation);
    rec.grants = extract_grants(citation);

    if let Some(article) = citation.child("Article") {
        if let Some(title) = article.child_text("ArticleTitle").filter(|s| !s.is_empty()) {
            rec.title = title;
        }

        let (short, full, affiliation) = extract_authors(article);
        rec.authors_short = short;
        rec.authors_full = full;
        rec.affiliation = affiliation;

        if let Some(journal) = article.child("Journal") {
            if let Some(name) = journal.child_text("Title").filter(|s| !s.is_empty()) {
                rec.journal = name;
            }
            rec.issn = extract_issn(journal);
            rec.pub_date = extract_pub_date(journal);
        }

        rec.doi = extract_elocation_doi(article);
        rec.pub_types = extract_pub_types(article);
        rec.abstract_text = extract_abstract(article);
    }

    if rec.doi.is_empty() {
        rec.doi = article_id(entry, "doi").unwrap_or_default();
    }
    rec.pmc_id = article_id(entry, "pmc").unwrap_or_default();
    rec.is_open_access = i32::from(!rec.pmc_id.is_empty());

    rec
}

/// Up to 3 "Last Initials" names plus "et al.", the unabridged join, and
/// the affiliation of the first author that declares one.
fn extract_authors(article: &XmlNode) -> (String, String, String) {
    let mut names: Vec<String> = Vec::new();
    let mut affiliation = String::new();

    if let Some(list) = article.child("AuthorList") {
        for author in list.children("Author") {
            let last = author.child_text("LastName").unwrap_or_default();
            if last.is_empty() {
                continue;
            }
            let initials = author.child_text("Initials").unwrap_or_default();
            names.push(format!("{last} {initials}").trim().to_string());

            if affiliation.is_empty() {
                if let Some(aff) = author
                    .child("AffiliationInfo")
                    .and_then(|info| info.child_text("Affiliation"))
                    .filter(|s| !s.is_empty())
                {
                    affiliation = aff;
                }
            }
        }
    }

    let full = names.join(", ");
    let short = if names.len() > 3 {
        format!("{} et al.", names[..3].join(", "))
    } else {
        full.clone()
    };
    (short, full, affiliation)
}

/// Electronic ISSN preferred, Print as fallback, empty if neither.
fn extract_issn(journal: &XmlNode) -> String {
    for issn_type in ["Electronic", "Print"] {
        for issn in journal.children("ISSN") {
            if issn.attr("IssnType") == Some(issn_type) {
                let text = issn.deep_text().trim().to_string();
                if !text.is_empty() {
                    return text;
                }
            }
        }
    }
    String::new()
}

/// "YYYY Mon Day" from whichever components exist, else the medline
/// free-text date, else the policy default.
fn extract_pub_date(journal: &XmlNode) -> String {
    let Some(pub_date) = journal.find(&["JournalIssue", "PubDate"]) else {
        return default_for("pub_date").to_string();
    };
    let parts: Vec<String> = ["Year", "Month", "Day"]
        .iter()
        .filter_map(|name| pub_date.child_text(name).filter(|s| !s.is_empty()))
        .collect();
    if !parts.is_empty() {
        return parts.join(" ");
    }
    pub_date
        .child_text("MedlineDate")
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default_for("pub_date").to_string())
}

fn extract_elocation_doi(article: &XmlNode) -> String {
    for eloc in article.children("ELocationID") {
        if eloc.attr("EIdType") == Some("doi") {
            let text = eloc.deep_text().trim().to_string();
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

/// First article-identifier of the given type from the PubmedData block.
fn article_id(entry: &XmlNode, id_type: &str) -> Option<String> {
    let list = entry.child("PubmedData")?.child("ArticleIdList")?;
    list.children("ArticleId")
        .filter(|aid| aid.attr("IdType") == Some(id_type))
        .map(|aid| aid.deep_text().trim().to_string())
        .find(|text| !text.is_empty())
}

/// Comma-joined publication types, excluding the default "Journal Article".
fn extract_pub_types(article: &XmlNode) -> String {
    let Some(list) = article.child("PublicationTypeList") else {
        return String::new();
    };
    list.children("PublicationType")
        .map(|pt| pt.deep_text().trim().to_string())
        .filter(|t| !t.is_empty() && t != "Journal Article")
        .collect::<Vec<_>>()
        .join(", ")
}

/// Major-topic terms prefixed "*" and sorted ahead of the rest,
/// alphabetical within each group, capped at [`MESH_TERM_CAP`].
fn extract_mesh_terms(citation: &XmlNode) -> String {
    let Some(list) = citation.child("MeshHeadingList") else {
        return String::new();
    };
    let mut terms: Vec<String> = Vec::new();
    for heading in list.children("MeshHeading") {
        let Some(descriptor) = heading.child("DescriptorName") else {
            continue;
        };
        let name = descriptor.deep_text().trim().to_string();
        if name.is_empty() {
            continue;
        }
        if descriptor.attr("MajorTopicYN") == Some("Y") {
            terms.push(format!("*{name}"));
        } else {
            terms.push(name);
        }
    }
    terms.sort_by(|a, b| {
        (!a.starts_with('*'), a).cmp(&(!b.starts_with('*'), b))
    });
    terms.truncate(MESH_TERM_CAP);
    terms.join(", ")
}

/// Funding-agency names, deduplicated in first-seen order.
fn extract_grants(citation: &XmlNode) -> String {
    let Some(list) = citation.descendant("GrantList") else {
        return default_for("grants").to_string();
    };
    let mut agencies: Vec<String> = Vec::new();
    for grant in list.children("Grant") {
        let agency = grant.child_text("Agency").unwrap_or_default();
        if !agency.is_empty() && !agencies.contains(&agency) {
            agencies.push(agency);
        }
    }
    if agencies.is_empty() {
        default_for("grants").to_string()
    } else {
        agencies.join(", ")
    }
}

/// All abstract segments, labeled ones rendered "Label: text", separated
/// by a blank line. Inline markup inside a segment is kept via deep text.
fn extract_abstract(article: &XmlNode) -> String {
    let Some(abstract_el) = article.child("Abstract") else {
        return String::new();
    };
    let mut parts: Vec<String> = Vec::new();
    for segment in abstract_el.children("AbstractText") {
        let text = segment.deep_text().trim().to_string();
        match segment.attr("Label") {
            Some(label) if !label.is_empty() => parts.push(format!("{label}: {text}")),
            _ => parts.push(text),
        }
    }
    parts.join("\n\n")
}
