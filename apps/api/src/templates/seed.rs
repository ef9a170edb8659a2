use crate::models::template::{NewTemplate, TemplateCategory, TemplateMetadata};

/// Canonical templates every deployment starts with.
pub fn default_templates() -> Vec<NewTemplate> {
    vec![
        NewTemplate {
            name: "professional".to_string(),
            display_name: "Professional".to_string(),
            description: "A clean single-column layout suited to corporate and traditional roles."
                .to_string(),
            metadata: TemplateMetadata {
                category: TemplateCategory::Professional,
                color: "#1e3a8a".to_string(),
                preview: "Single column with a bold header and clear section dividers".to_string(),
                thumbnail: None,
                features: Some(vec![
                    "ATS-friendly".to_string(),
                    "Single column".to_string(),
                    "Conservative typography".to_string(),
                ]),
            },
            is_premium: false,
            is_active: true,
        },
        NewTemplate {
            name: "two-column".to_string(),
            display_name: "Two Column".to_string(),
            description: "A modern layout with a sidebar for skills, languages and contact details."
                .to_string(),
            metadata: TemplateMetadata {
                category: TemplateCategory::Modern,
                color: "#0f766e".to_string(),
                preview: "Left sidebar with skills, main column with experience".to_string(),
                thumbnail: None,
                features: Some(vec![
                    "Sidebar".to_string(),
                    "Skill highlights".to_string(),
                    "Compact".to_string(),
                ]),
            },
            is_premium: false,
            is_active: true,
        },
    ]
}
