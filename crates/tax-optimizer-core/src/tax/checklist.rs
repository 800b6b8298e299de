use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::tax::config::{DeductionLimits, TaxYear};
use crate::tax::profile::TaxProfile;
use crate::TaxOptimizerResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentGroup {
    pub category: String,
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadlineReminder {
    pub label: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChecklist {
    pub tax_year: String,
    pub taxpayer: String,
    pub mandatory_documents: Vec<String>,
    pub groups: Vec<DocumentGroup>,
    /// Chronological
    pub deadlines: Vec<DeadlineReminder>,
}

fn group(category: &str, documents: &[&str]) -> DocumentGroup {
    DocumentGroup {
        category: category.to_string(),
        documents: documents.iter().map(|d| d.to_string()).collect(),
    }
}

/// Documents to gather for a return, plus dated reminders for the year.
pub fn document_checklist(
    tax_year: &TaxYear,
    limits: &DeductionLimits,
    profile: &TaxProfile,
) -> TaxOptimizerResult<DocumentChecklist> {
    let mut deduction_proofs = vec![
        "Health insurance premium receipts",
        "Home loan interest certificate",
        "Education loan interest certificate",
        "Donation receipts (80G)",
        "NPS statements",
    ];
    if limits.is_senior(profile.age) {
        deduction_proofs.push("Medical bills for senior citizens");
    }

    let groups = vec![
        group(
            "Income Documents",
            &[
                "Form 16",
                "Form 16A (TDS certificates)",
                "Bank interest certificates",
                "Dividend statements",
                "Capital gains statements",
            ],
        ),
        group(
            "Investment Proofs",
            &[
                "PPF statements",
                "ELSS certificates",
                "Life insurance premium receipts",
                "NSC certificates",
                "EPF annual statement",
            ],
        ),
        group("Deduction Proofs", &deduction_proofs),
        group(
            "Previous Year",
            &[
                "Previous year ITR acknowledgment",
                "Form 26AS",
                "AIS (Annual Information Statement)",
            ],
        ),
    ];

    let mandatory_documents = [
        "PAN Card",
        "Aadhaar Card",
        "Bank account details for refund",
        "Form 16 from employer",
        "Form 26AS (Tax Credit Statement)",
        "AIS (Annual Information Statement)",
    ]
    .iter()
    .map(|d| d.to_string())
    .collect();

    let mut deadlines: Vec<DeadlineReminder> = tax_year
        .advance_tax_dates()?
        .into_iter()
        .enumerate()
        .map(|(i, date)| DeadlineReminder {
            label: format!("Advance tax instalment {}", i + 1),
            date,
        })
        .collect();
    deadlines.push(DeadlineReminder {
        label: "Investment deadline for deductions".into(),
        date: tax_year.investment_deadline()?,
    });
    deadlines.push(DeadlineReminder {
        label: "Income tax return filing due date".into(),
        date: tax_year.filing_due_date()?,
    });
    deadlines.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.label.cmp(&b.label)));

    Ok(DocumentChecklist {
        tax_year: tax_year.label.clone(),
        taxpayer: profile
            .user_type
            .clone()
            .unwrap_or_else(|| "taxpayer".to_string()),
        mandatory_documents,
        groups,
        deadlines,
    })
}
