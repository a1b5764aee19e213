//! Recipe create, list, and get operations.
//!
//! Listing returns summary rows only. [`get_recipe`] composes explicit
//! queries for ingredients, steps, and categories; nothing is loaded
//! implicitly.

use chrono::Utc;
use recipebox_common::{CategoryId, Error, RecipeId, Result};
use rusqlite::Connection;

use crate::models::{Category, CategoryRef, Ingredient, NewRecipe, RecipeDetail, RecipeSummary, Step};
use crate::queries::categories;

/// Column list used in recipe SELECT statements.
const COLS: &str = "id, title, description, prep_time, cook_time, created_at, updated_at";

/// Create a recipe with its ingredients, steps, and category links.
///
/// Everything is written in a single transaction. Categories must already
/// exist; an unknown reference fails with [`Error::Validation`] and nothing
/// is persisted. Repeated references to the same category are linked once.
pub fn create_recipe(conn: &Connection, new: &NewRecipe) -> Result<RecipeDetail> {
    let title = new.title.trim();
    if title.is_empty() {
        return Err(Error::validation("Recipe title must not be empty"));
    }

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;
    let now = Utc::now().to_rfc3339();

    tx.execute(
        "INSERT INTO recipes (title, description, prep_time, cook_time, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            title,
            &new.description,
            new.prep_time,
            new.cook_time,
            &now,
            &now
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    let id = RecipeId::new(tx.last_insert_rowid());

    let mut ingredients = Vec::with_capacity(new.ingredients.len());
    for ingredient in &new.ingredients {
        tx.execute(
            "INSERT INTO ingredients (recipe_id, name, quantity) VALUES (?1, ?2, ?3)",
            rusqlite::params![id.get(), &ingredient.name, &ingredient.quantity],
        )
        .map_err(|e| Error::database(e.to_string()))?;
        ingredients.push(Ingredient {
            id: tx.last_insert_rowid(),
            recipe_id: id,
            name: ingredient.name.clone(),
            quantity: ingredient.quantity.clone(),
        });
    }

    let mut steps = Vec::with_capacity(new.steps.len());
    for step in &new.steps {
        tx.execute(
            "INSERT INTO steps (recipe_id, step_number, instructions) VALUES (?1, ?2, ?3)",
            rusqlite::params![id.get(), step.step_number, &step.instructions],
        )
        .map_err(|e| Error::database(e.to_string()))?;
        steps.push(Step {
            id: tx.last_insert_rowid(),
            recipe_id: id,
            step_number: step.step_number,
            instructions: step.instructions.clone(),
        });
    }
    // Same order get_recipe reads them back in.
    steps.sort_by_key(|s| (s.step_number, s.id));

    let mut linked: Vec<Category> = Vec::new();
    for reference in &new.categories {
        let category = resolve_category(&tx, reference)?;
        if linked.iter().any(|c| c.id == category.id) {
            continue;
        }
        tx.execute(
            "INSERT INTO recipe_categories (recipe_id, category_id) VALUES (?1, ?2)",
            rusqlite::params![id.get(), category.id.get()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
        linked.push(category);
    }
    linked.sort_by(|a, b| a.name.cmp(&b.name));

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(RecipeDetail {
        recipe: RecipeSummary {
            id,
            title: title.to_string(),
            description: new.description.clone(),
            prep_time: i64::from(new.prep_time),
            cook_time: i64::from(new.cook_time),
            created_at: now.clone(),
            updated_at: now,
        },
        ingredients,
        steps,
        categories: linked,
    })
}

fn resolve_category(conn: &Connection, reference: &CategoryRef) -> Result<Category> {
    let found = match reference {
        CategoryRef::Id(id) | CategoryRef::ById { id } => {
            categories::get_category(conn, CategoryId::new(*id))?
        }
        CategoryRef::Name(name) | CategoryRef::ByName { name } => {
            categories::get_category_by_name(conn, name)?
        }
    };
    found.ok_or_else(|| Error::validation(format!("Unknown category: {}", describe(reference))))
}

fn describe(reference: &CategoryRef) -> String {
    match reference {
        CategoryRef::Id(id) | CategoryRef::ById { id } => format!("id {id}"),
        CategoryRef::Name(name) | CategoryRef::ByName { name } => format!("{name:?}"),
    }
}

/// List recipe summaries, optionally restricted to one category.
///
/// An empty filter is the same as no filter. Matching on the category name
/// is exact and case-sensitive. Recipes are ordered by id.
pub fn list_recipes(conn: &Connection, category: Option<&str>) -> Result<Vec<RecipeSummary>> {
    let (q, params): (String, Vec<&str>) = match category.filter(|c| !c.is_empty()) {
        None => (format!("SELECT {COLS} FROM recipes ORDER BY id"), vec![]),
        Some(name) => (
            format!(
                "SELECT {COLS} FROM recipes r
                 WHERE EXISTS (
                     SELECT 1 FROM recipe_categories rc
                     JOIN categories c ON c.id = rc.category_id
                     WHERE rc.recipe_id = r.id AND c.name = ?1
                 )
                 ORDER BY id"
            ),
            vec![name],
        ),
    };

    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params), RecipeSummary::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Get a recipe summary row by ID.
pub fn get_recipe_summary(conn: &Connection, id: RecipeId) -> Result<Option<RecipeSummary>> {
    let q = format!("SELECT {COLS} FROM recipes WHERE id = ?1");
    match conn.query_row(&q, [id.get()], RecipeSummary::from_row) {
        Ok(r) => Ok(Some(r)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Get a recipe with ingredients, steps, and categories.
pub fn get_recipe(conn: &Connection, id: RecipeId) -> Result<Option<RecipeDetail>> {
    let Some(recipe) = get_recipe_summary(conn, id)? else {
        return Ok(None);
    };

    Ok(Some(RecipeDetail {
        recipe,
        ingredients: list_ingredients(conn, id)?,
        steps: list_steps(conn, id)?,
        categories: categories::list_categories_for_recipe(conn, id)?,
    }))
}

/// List a recipe's ingredients in insertion order.
pub fn list_ingredients(conn: &Connection, recipe_id: RecipeId) -> Result<Vec<Ingredient>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, recipe_id, name, quantity FROM ingredients
             WHERE recipe_id = ?1 ORDER BY id",
        )
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([recipe_id.get()], Ingredient::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// List a recipe's steps ordered by step number, ties in insertion order.
pub fn list_steps(conn: &Connection, recipe_id: RecipeId) -> Result<Vec<Step>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, recipe_id, step_number, instructions FROM steps
             WHERE recipe_id = ?1 ORDER BY step_number, id",
        )
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([recipe_id.get()], Step::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewIngredient, NewStep};
    use crate::pool::{get_conn, init_memory_pool};

    fn flan() -> NewRecipe {
        NewRecipe {
            title: "Flan".into(),
            description: "Caramel custard".into(),
            prep_time: 15,
            cook_time: 50,
            ingredients: vec![
                NewIngredient {
                    name: "Eggs".into(),
                    quantity: "4".into(),
                },
                NewIngredient {
                    name: "Milk".into(),
                    quantity: "500 ml".into(),
                },
            ],
            steps: vec![
                NewStep {
                    step_number: 1,
                    instructions: "Make the caramel".into(),
                },
                NewStep {
                    step_number: 3,
                    instructions: "Bake in a water bath".into(),
                },
                NewStep {
                    step_number: 2,
                    instructions: "Whisk eggs and milk".into(),
                },
            ],
            categories: vec![],
        }
    }

    #[test]
    fn test_create_then_get_round_trip() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let created = create_recipe(&conn, &flan()).unwrap();
        let fetched = get_recipe(&conn, created.recipe.id).unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.ingredients.len(), 2);
        let names: Vec<_> = fetched.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Eggs", "Milk"]);

        let numbers: Vec<_> = fetched.steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(fetched.steps.iter().all(|s| s.recipe_id == created.recipe.id));
    }

    #[test]
    fn test_duplicate_step_numbers_allowed() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let mut recipe = flan();
        recipe.steps = vec![
            NewStep {
                step_number: 5,
                instructions: "first".into(),
            },
            NewStep {
                step_number: 5,
                instructions: "second".into(),
            },
        ];
        let created = create_recipe(&conn, &recipe).unwrap();
        let fetched = get_recipe(&conn, created.recipe.id).unwrap().unwrap();
        let text: Vec<_> = fetched.steps.iter().map(|s| s.instructions.as_str()).collect();
        assert_eq!(text, vec!["first", "second"]);
    }

    #[test]
    fn test_get_missing_recipe() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        assert!(get_recipe(&conn, RecipeId::new(404)).unwrap().is_none());
    }

    #[test]
    fn test_list_with_category_filter() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let dessert = categories::create_category(&conn, "Dessert").unwrap();
        categories::create_category(&conn, "Soup").unwrap();

        let mut recipe = flan();
        recipe.categories = vec![CategoryRef::Name("Dessert".into())];
        let created = create_recipe(&conn, &recipe).unwrap();
        assert_eq!(created.categories, vec![dessert]);

        let mut broth = NewRecipe {
            title: "Broth".into(),
            ..Default::default()
        };
        broth.categories = vec![CategoryRef::ByName {
            name: "Soup".into(),
        }];
        create_recipe(&conn, &broth).unwrap();

        let desserts = list_recipes(&conn, Some("Dessert")).unwrap();
        assert_eq!(desserts.len(), 1);
        assert_eq!(desserts[0].title, "Flan");

        assert_eq!(list_recipes(&conn, None).unwrap().len(), 2);
        assert_eq!(list_recipes(&conn, Some("")).unwrap().len(), 2);
        assert!(list_recipes(&conn, Some("dessert")).unwrap().is_empty());
        assert!(list_recipes(&conn, Some("Breakfast")).unwrap().is_empty());
    }

    #[test]
    fn test_repeated_category_linked_once() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        let dessert = categories::create_category(&conn, "Dessert").unwrap();

        let mut recipe = flan();
        recipe.categories = vec![
            CategoryRef::Id(dessert.id.get()),
            CategoryRef::Name("Dessert".into()),
        ];
        let created = create_recipe(&conn, &recipe).unwrap();
        assert_eq!(created.categories.len(), 1);
        assert_eq!(list_recipes(&conn, Some("Dessert")).unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_category_rolls_back() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let mut recipe = flan();
        recipe.categories = vec![CategoryRef::Name("Nope".into())];
        let err = create_recipe(&conn, &recipe).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        assert!(list_recipes(&conn, None).unwrap().is_empty());
        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM ingredients", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_blank_title_rejected() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let recipe = NewRecipe {
            title: "  ".into(),
            ..Default::default()
        };
        let err = create_recipe(&conn, &recipe).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_summaries_carry_no_nested_rows() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        create_recipe(&conn, &flan()).unwrap();

        let list = list_recipes(&conn, None).unwrap();
        let json = serde_json::to_value(&list[0]).unwrap();
        assert!(json.get("ingredients").is_none());
        assert!(json.get("steps").is_none());
    }
}
