//! Storage-format macro snippets available to templates.

use quick_xml::escape::escape;

/// Collapsible "expand" macro around storage-format `body`.
#[must_use]
pub fn expand_macro(title: &str, body: &str) -> String {
    format!(
        "<ac:structured-macro ac:name=\"expand\">\
         <ac:parameter ac:name=\"title\">{}</ac:parameter>\
         <ac:rich-text-body>{body}</ac:rich-text-body>\
         </ac:structured-macro>",
        escape(title)
    )
}

/// Raw HTML macro. `content` is wrapped in CDATA verbatim.
#[must_use]
pub fn html_macro(content: &str) -> String {
    // "]]>" would end the CDATA section early; split it across two sections.
    let content = content.replace("]]>", "]]]]><![CDATA[>");
    format!(
        "<ac:structured-macro ac:name=\"html\">\
         <ac:plain-text-body><![CDATA[{content}]]></ac:plain-text-body>\
         </ac:structured-macro>"
    )
}
