//! Translation of filter expressions into MongoDB filter documents.

use bson::{Document, Bson, doc};

use docadmin_core::{
    query::{QueryVisitor, Expr, FieldOp},
    error::StoreError,
};


/// Translates filter expressions into MongoDB's native filter syntax.
pub(crate) struct MongoQueryTranslator;

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = StoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$or": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        // $not only applies to operator expressions, $nor negates a whole filter
        Ok(doc! {
            "$nor": [self.visit_expr(expr)?],
        })
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: { "$exists": should_exist },
        })
    }

    fn visit_field(&mut self, field: &str, op: FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Ne => doc! { "$ne": value },
                FieldOp::Gt => doc! { "$gt": value },
                FieldOp::Gte => doc! { "$gte": value },
                FieldOp::Lt => doc! { "$lt": value },
                FieldOp::Lte => doc! { "$lte": value },
                FieldOp::Contains => match value {
                    Bson::String(s) => doc! { "$regex": regex::escape(s), "$options": "i" },
                    other => doc! { "$elemMatch": { "$eq": other } },
                },
                FieldOp::AnyOf => match value {
                    Bson::Array(_) => doc! { "$in": value },
                    other => return Err(StoreError::Backend(format!(
                        "AnyOf operator requires an array value, got {other}"
                    ))),
                },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docadmin_core::query::Filter;

    #[test]
    fn test_contains_escapes_regex() {
        let translated = MongoQueryTranslator
            .visit_expr(&Filter::contains("name", "a.b"))
            .unwrap();

        assert_eq!(translated, doc! { "name": { "$regex": "a\\.b", "$options": "i" } });
    }

    #[test]
    fn test_or_of_fields() {
        let translated = MongoQueryTranslator
            .visit_expr(&Filter::or([Filter::eq("a", 1), Filter::exists("b")]))
            .unwrap();

        assert_eq!(
            translated,
            doc! { "$or": [ { "a": { "$eq": 1 } }, { "b": { "$exists": true } } ] }
        );
    }

    #[test]
    fn test_any_of_requires_array() {
        let result = MongoQueryTranslator.visit_expr(&Expr::field(
            "a".to_string(),
            FieldOp::AnyOf,
            Bson::Int32(1),
        ));

        assert!(result.is_err());
    }
}
