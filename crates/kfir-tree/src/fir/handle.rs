//! Typed handles over shared FIR elements.

use super::*;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

/// A concrete FIR variant that a [`Fir`] handle can be narrowed to.
pub trait FirVariant: 'static {
    const KIND: FirElementKind;

    fn project(element: &FirElement) -> Option<&Self>;
}

macro_rules! impl_fir_variant {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl FirVariant for $ty {
                const KIND: FirElementKind = FirElementKind::$variant;

                #[inline]
                fn project(element: &FirElement) -> Option<&Self> {
                    match element {
                        FirElement::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_fir_variant! {
    FirFile => File,
    FirRegularClass => RegularClass,
    FirSimpleFunction => SimpleFunction,
    FirProperty => Property,
    FirValueParameter => ValueParameter,
    FirBlock => Block,
    FirFunctionCall => FunctionCall,
    FirQualifiedAccessExpression => QualifiedAccessExpression,
    FirThisReceiverExpression => ThisReceiver,
    FirConstExpression => ConstExpression,
    FirIfExpression => IfExpression,
    FirReturnExpression => ReturnExpression,
    FirTypeRefElement => TypeRef,
    FirErrorExpression => ErrorExpression,
}

/// Declaration variants: everything with a symbol.
pub trait FirDeclarationVariant: FirVariant {
    fn symbol(&self) -> SymbolId;
    fn name(&self) -> Atom;
    fn resolve_phase(&self) -> FirResolvePhase;
    fn origin(&self) -> FirDeclarationOrigin;
}

impl FirDeclarationVariant for FirRegularClass {
    fn symbol(&self) -> SymbolId {
        self.symbol
    }
    fn name(&self) -> Atom {
        self.name
    }
    fn resolve_phase(&self) -> FirResolvePhase {
        self.resolve_phase
    }
    fn origin(&self) -> FirDeclarationOrigin {
        self.origin
    }
}

impl FirDeclarationVariant for FirSimpleFunction {
    fn symbol(&self) -> SymbolId {
        self.symbol
    }
    fn name(&self) -> Atom {
        self.name
    }
    fn resolve_phase(&self) -> FirResolvePhase {
        self.resolve_phase
    }
    fn origin(&self) -> FirDeclarationOrigin {
        self.origin
    }
}

impl FirDeclarationVariant for FirProperty {
    fn symbol(&self) -> SymbolId {
        self.symbol
    }
    fn name(&self) -> Atom {
        self.name
    }
    fn resolve_phase(&self) -> FirResolvePhase {
        self.resolve_phase
    }
    fn origin(&self) -> FirDeclarationOrigin {
        self.origin
    }
}

impl FirDeclarationVariant for FirValueParameter {
    fn symbol(&self) -> SymbolId {
        self.symbol
    }
    fn name(&self) -> Atom {
        self.name
    }
    fn resolve_phase(&self) -> FirResolvePhase {
        self.resolve_phase
    }
    fn origin(&self) -> FirDeclarationOrigin {
        FirDeclarationOrigin::Source
    }
}

/// A shared FIR element statically known to be an `E`.
///
/// Cloning shares the same allocation; two handles are the same element
/// when [`Fir::ptr_eq`] holds.
pub struct Fir<E: FirVariant> {
    element: Arc<FirElement>,
    _variant: PhantomData<fn() -> E>,
}

impl<E: FirVariant> Fir<E> {
    /// Narrow a shared element, handing it back unchanged on a kind mismatch.
    pub fn narrow(element: Arc<FirElement>) -> Result<Self, Arc<FirElement>> {
        if E::project(&element).is_some() {
            Ok(Self {
                element,
                _variant: PhantomData,
            })
        } else {
            Err(element)
        }
    }

    #[inline]
    pub fn element(&self) -> &Arc<FirElement> {
        &self.element
    }

    #[inline]
    pub fn into_element(self) -> Arc<FirElement> {
        self.element
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.element, &other.element)
    }
}

impl<E: FirVariant> Deref for Fir<E> {
    type Target = E;

    fn deref(&self) -> &E {
        match E::project(&self.element) {
            Some(inner) => inner,
            // `narrow` is the only constructor and checks the variant.
            None => unreachable!("Fir<{}> holds a {}", E::KIND, self.element.kind()),
        }
    }
}

impl<E: FirVariant> Clone for Fir<E> {
    fn clone(&self) -> Self {
        Self {
            element: Arc::clone(&self.element),
            _variant: PhantomData,
        }
    }
}

impl<E: FirVariant + fmt::Debug> fmt::Debug for Fir<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fir").field(&**self).finish()
    }
}
