/// A landmark decision with a pre-generated case page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MajorCase {
    pub slug: &'static str,
    pub name: &'static str,
    pub area: &'static str,
    pub importance: Importance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    Critical,
    High,
}

impl Importance {
    pub fn label(self) -> &'static str {
        match self {
            Importance::Critical => "critical",
            Importance::High => "high",
        }
    }
}

const fn case(slug: &'static str, name: &'static str, area: &'static str, importance: Importance) -> MajorCase {
    MajorCase {
        slug,
        name,
        area,
        importance,
    }
}

use Importance::{Critical, High};

pub const MAJOR_CASES: &[MajorCase] = &[
    // Charter fundamentals
    case("r-v-oakes-1986", "R. v. Oakes", "Charter", Critical),
    case("r-v-morgentaler-1988", "R. v. Morgentaler", "Charter", Critical),
    case("reference-re-secession-of-quebec-1998", "Reference re Secession of Quebec", "Constitutional", Critical),
    case("r-v-sparrow-1990", "R. v. Sparrow", "Aboriginal", Critical),
    case("roncarelli-v-duplessis-1959", "Roncarelli v. Duplessis", "Rule of Law", Critical),
    // Section 7
    case("r-v-stinchcombe-1991", "R. v. Stinchcombe", "Criminal", High),
    case("carter-v-canada-2015", "Carter v. Canada", "Charter", High),
    case("blencoe-v-bc-2000", "Blencoe v. BC", "Charter", High),
    // Section 8
    case("r-v-collins-1987", "R. v. Collins", "Search and Seizure", High),
    case("r-v-golden-2001", "R. v. Golden", "Search and Seizure", High),
    case("r-v-fearon-2014", "R. v. Fearon", "Search and Seizure", High),
    // Section 11
    case("r-v-askov-1990", "R. v. Askov", "Criminal", High),
    case("r-v-jordan-2016", "R. v. Jordan", "Criminal", Critical),
    // Section 15
    case("andrews-v-law-society-of-bc-1989", "Andrews v. Law Society of BC", "Equality", Critical),
    case("law-v-canada-1999", "Law v. Canada", "Equality", High),
    // Administrative law
    case("dunsmuir-v-new-brunswick-2008", "Dunsmuir v. New Brunswick", "Administrative", Critical),
    case(
        "vavilov-2019",
        "Canada (Minister of Citizenship and Immigration) v. Vavilov",
        "Administrative",
        Critical,
    ),
    // Criminal law
    case("r-v-grant-2009", "R. v. Grant", "Criminal", Critical),
    case("r-v-gladue-1999", "R. v. Gladue", "Sentencing", Critical),
    case("r-v-lavallee-1990", "R. v. Lavallee", "Criminal", High),
];

pub fn find(slug: &str) -> Option<&'static MajorCase> {
    MAJOR_CASES.iter().find(|c| c.slug == slug)
}
