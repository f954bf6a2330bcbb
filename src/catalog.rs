//! Pattern catalog - the fixed table of legal intents and reply templates
//!
//! The built-in catalog is constructed once and shared read-only for the
//! lifetime of the process. The last template is always the fallback and
//! sits at index `intents.len()`.

use std::sync::LazyLock;

use ahash::AHashMap;

use crate::types::Intent;

/// Placeholder replaced with the user's original query in the fallback template
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Catalog construction errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("expected {expected} templates (one per intent plus fallback), got {actual}")]
    TemplateCount { expected: usize, actual: usize },

    #[error("intent '{id}' references template {index}, outside 0..{limit}")]
    TemplateOutOfRange { id: String, index: usize, limit: usize },

    #[error("duplicate intent id '{0}'")]
    DuplicateId(String),

    #[error("intent '{0}' has a keyword with empty words")]
    EmptyKeywordWord(String),
}

/// Immutable intent table plus its response templates
#[derive(Debug, Clone)]
pub struct Catalog {
    intents: Vec<Intent>,
    templates: Vec<String>,
    by_id: AHashMap<String, usize>,
}

impl Catalog {
    /// Validate and build a catalog.
    ///
    /// `templates` must hold one entry per intent followed by the fallback.
    pub fn new(intents: Vec<Intent>, templates: Vec<String>) -> Result<Self, CatalogError> {
        let expected = intents.len() + 1;
        if templates.len() != expected {
            return Err(CatalogError::TemplateCount {
                expected,
                actual: templates.len(),
            });
        }

        let mut by_id = AHashMap::with_capacity(intents.len());
        for (position, intent) in intents.iter().enumerate() {
            if intent.template_index >= intents.len() {
                return Err(CatalogError::TemplateOutOfRange {
                    id: intent.id.clone(),
                    index: intent.template_index,
                    limit: intents.len(),
                });
            }
            // Word splitting is on single spaces; an empty word would match everything
            if intent
                .keywords
                .iter()
                .any(|k| k.split(' ').any(|w| w.is_empty()))
            {
                return Err(CatalogError::EmptyKeywordWord(intent.id.clone()));
            }
            if by_id.insert(intent.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(intent.id.clone()));
            }
        }

        Ok(Self {
            intents,
            templates,
            by_id,
        })
    }

    /// The built-in Arabic legal catalog
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Intent> {
        self.by_id.get(id).map(|&i| &self.intents[i])
    }

    pub fn template(&self, index: usize) -> Option<&str> {
        self.templates.get(index).map(String::as_str)
    }

    /// Index of the fallback template, one past the last intent
    pub fn fallback_index(&self) -> usize {
        self.intents.len()
    }

    pub fn fallback_template(&self) -> &str {
        &self.templates[self.fallback_index()]
    }
}

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| {
    let intents = vec![
        Intent::new(
            "employmentContract",
            &["عقد عمل", "عقود العمل", "مراجعة عقد", "حقوق الموظف"],
            &["وظيفة", "موظف", "راتب", "صاحب العمل", "فصل تعسفي", "استقالة"],
            0,
        ),
        Intent::new(
            "tenantRights",
            &["مستأجر", "عقد إيجار", "حقوق المستأجر", "إخلاء"],
            &["إيجار", "شقة", "مالك العقار", "سكن", "أجرة"],
            1,
        ),
        Intent::new(
            "familyLaw",
            &["طلاق", "حضانة", "نفقة", "عقد زواج"],
            &["أسرة", "أطفال", "زوجة", "زوج", "خلع"],
            2,
        ),
        Intent::new(
            "companyFormation",
            &["تأسيس شركة", "سجل تجاري", "عقد شراكة", "شركة ذات مسؤولية محدودة"],
            &["شركة", "مشروع", "تجارة", "شريك", "ترخيص"],
            3,
        ),
        Intent::new(
            "criminalDefense",
            &["قضية جنائية", "بلاغ", "تهمة", "محامي جنائي"],
            &["شرطة", "سجن", "جريمة", "اعتقال", "نيابة"],
            4,
        ),
        Intent::new(
            "inheritance",
            &["ميراث", "تركة", "وصية", "حصر الورثة"],
            &["ورثة", "إرث", "متوفى", "تقسيم"],
            5,
        ),
    ];

    let templates = [
        "بخصوص عقد العمل، ننصحك بالتأكد من وضوح المسمى الوظيفي والراتب وساعات العمل ومدة العقد وشروط إنهائه. \
         احتفظ بنسخة موقعة من العقد، ولا توقّع على أي بند غير مفهوم قبل مراجعته مع محامٍ مختص في قضايا العمل.",
        "للمستأجر الحق في الانتفاع بالعين المؤجرة بهدوء، وفي استلامها بحالة صالحة، وفي عدم الإخلاء إلا بحكم أو وفق شروط العقد. \
         راجع مدة عقد الإيجار وشروط التجديد والزيادة، واحتفظ بإيصالات دفع الأجرة.",
        "قضايا الأحوال الشخصية مثل الطلاق والحضانة والنفقة تخضع لإجراءات دقيقة تختلف بحسب ظروف كل أسرة. \
         يُنصح بتوثيق كل المستندات المتعلقة بالزواج والدخل والأطفال، والتواصل مع محامٍ مختص بالأحوال الشخصية.",
        "لتأسيس شركة تحتاج إلى تحديد الشكل القانوني المناسب، وحجز الاسم التجاري، وإعداد عقد التأسيس، والتسجيل في السجل التجاري \
         واستخراج التراخيص اللازمة. يمكن لمحامينا مساعدتك في صياغة عقد الشراكة وحماية حقوق الشركاء.",
        "في القضايا الجنائية، لك الحق في الاستعانة بمحامٍ وعدم الإدلاء بأقوال قبل حضوره. \
         لا توقّع على أي محضر قبل قراءته جيداً، وتواصل فوراً مع محامٍ جنائي لمتابعة البلاغ أو التهمة.",
        "توزيع التركة يبدأ بحصر الورثة وسداد ديون المتوفى وتنفيذ الوصية في حدود الثلث، ثم تُقسم الأنصبة وفق أحكام الميراث. \
         يُنصح باستخراج صك حصر الورثة وجرد الأصول قبل أي تقسيم.",
        "شكراً لتواصلك معنا بخصوص: \"{query}\". \
         نحن هنا لمساعدتك في استشاراتك القانونية. يرجى توضيح نوع المسألة (عمل، إيجار، أحوال شخصية، شركات، جنائي، ميراث) \
         لنقدم لك إجابة أدق، أو احجز استشارة مع أحد محامينا.",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect();

    match Catalog::new(intents, templates) {
        Ok(catalog) => catalog,
        Err(e) => panic!("built-in catalog is invalid: {}", e),
    }
});
